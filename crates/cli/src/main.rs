use std::process::ExitCode;

fn main() -> ExitCode {
    shopdesk_cli::run()
}
