pub mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use shopdesk_core::config::{ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "shopdesk",
    about = "Shopdesk customer support chatbot",
    long_about = "Answer order tracking, return policy, and product recommendation questions \
                  from local reference data. Runs an interactive chat when no command is given.",
    after_help = "Examples:\n  shopdesk\n  shopdesk ask \"where is my order ORD1234\"\n  \
                  shopdesk doctor --json\n  shopdesk --data-dir ./fixtures smoke"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Directory holding intents.json, orders.json, products.json and faqs.json"
    )]
    data_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file to load instead of shopdesk.toml or config/shopdesk.toml"
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "N",
        help = "Cap on products listed per recommendation reply"
    )]
    max_recommendations: Option<usize>,
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        help = "Log level (trace|debug|info|warn|error)"
    )]
    log_level: Option<String>,
    #[arg(long, global = true, value_name = "FORMAT", help = "Log format (compact|pretty|json)")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive chat session (default)")]
    Chat,
    #[command(about = "Answer a single message and exit")]
    Ask {
        #[arg(help = "Customer message to answer")]
        message: String,
        #[arg(long, help = "Emit the full turn as machine-readable JSON")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and report how each reference-data collection loaded")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run scripted conversation checks with per-check timing details")]
    Smoke,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                data_dir: self.data_dir.clone(),
                max_recommendations: self.max_recommendations,
                log_level: self.log_level.clone(),
                log_format: self.log_format,
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let result = match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => commands::chat::run(&options),
        Command::Ask { message, json } => commands::ask::run(&options, &message, json),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
        Command::Smoke => commands::smoke::run(&options),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber. Events go to stderr so stdout carries
/// only the conversation. `RUST_LOG`, when set, replaces the configured level.
pub fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(filter);

    match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
