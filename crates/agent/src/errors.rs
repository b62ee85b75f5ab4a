use shopdesk_core::ApplicationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid entity pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid response template `{name}`: {source}")]
    Template { name: &'static str, source: tera::Error },
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        ApplicationError::Initialization(value.to_string())
    }
}
