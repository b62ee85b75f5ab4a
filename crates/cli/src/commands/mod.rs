pub mod ask;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod smoke;

use serde::Serialize;
use shopdesk_agent::AgentRuntime;
use shopdesk_core::config::{AppConfig, LoadOptions};
use shopdesk_core::{ApplicationError, ReferenceData};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Config, logging, reference data and the agent pipeline, ready to answer.
/// Missing or malformed data files are not failures here; they surface as
/// warnings and in `doctor`.
pub fn bootstrap(command: &str, options: &LoadOptions) -> Result<AgentRuntime, CommandResult> {
    let config = AppConfig::load(options.clone()).map_err(|error| {
        let error = ApplicationError::from(error);
        CommandResult::failure(
            command,
            error.error_class(),
            format!("configuration issue: {error}"),
            2,
        )
    })?;

    if let Err(error) = crate::init_logging(&config.logging) {
        tracing::debug!(
            event_name = "system.cli.logging_reused",
            error = %error,
            "log subscriber already installed"
        );
    }

    build_runtime(command, &config)
}

pub fn build_runtime(command: &str, config: &AppConfig) -> Result<AgentRuntime, CommandResult> {
    let reference = ReferenceData::load(&config.data);
    AgentRuntime::new(reference)
        .map(|runtime| runtime.with_max_recommendations(config.resolver.max_recommendations))
        .map_err(|error| {
            let error = ApplicationError::from(error);
            CommandResult::failure(command, error.error_class(), error.to_string(), 3)
        })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
