use shopdesk_core::config::LoadOptions;

use crate::commands::{bootstrap, CommandResult};

pub fn run(options: &LoadOptions, message: &str, json_output: bool) -> CommandResult {
    let runtime = match bootstrap("ask", options) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let turn = runtime.handle(message);
    if !json_output {
        return CommandResult { exit_code: 0, output: turn.reply };
    }

    match serde_json::to_string_pretty(&turn) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure(
            "ask",
            "serialization",
            format!("turn serialization failed: {error}"),
            5,
        ),
    }
}
