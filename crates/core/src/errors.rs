use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Failure to read one reference-data collection. Never fatal: the loader
/// reports it and serves an empty collection instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not read data file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse data file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
}

impl DataError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::ReadFile { path, .. } | Self::ParseFile { path, .. } => path,
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "data_read",
            Self::ParseFile { .. } => "data_parse",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("agent initialization failure: {0}")]
    Initialization(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Data(error) => error.error_class(),
            Self::Initialization(_) => "agent_init",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => {
                "The assistant is misconfigured. Check the configuration and try again."
            }
            Self::Data(_) => "Some reference data could not be loaded; answers may be incomplete.",
            Self::Initialization(_) => "The assistant could not start. Please retry shortly.",
        }
    }
}
