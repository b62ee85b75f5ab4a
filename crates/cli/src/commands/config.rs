use std::fs;
use std::path::{Path, PathBuf};

use shopdesk_core::config::{read_env, resolve_config_path, AppConfig, LoadOptions};
use shopdesk_core::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

struct FieldSpec<'a> {
    key_path: &'a str,
    env_keys: &'a [&'a str],
    overridden: bool,
}

/// The config file that fed the load, if any, kept for source attribution.
struct ConfigFile {
    path: Option<PathBuf>,
    doc: Option<Value>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::from(error);
            return CommandResult::failure(
                "config",
                error.error_class(),
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let path = resolve_config_path(options.config_path.as_deref());
    let doc = load_config_file_doc(path.as_deref());
    let file = ConfigFile { path, doc };

    let data_dir_overridden = options.overrides.data_dir.is_some();
    let mut lines = vec![
        "effective config (source precedence: flag > env > file > default):".to_string(),
    ];

    lines.push(render_line(
        "data.dir",
        &config.data.dir.display().to_string(),
        file.source(FieldSpec {
            key_path: "data.dir",
            env_keys: &["SHOPDESK_DATA_DIR"],
            overridden: data_dir_overridden,
        }),
    ));
    for (key_path, env_key, value, path) in [
        (
            "data.intents_file",
            "SHOPDESK_INTENTS_FILE",
            &config.data.intents_file,
            config.data.intents_path(),
        ),
        (
            "data.orders_file",
            "SHOPDESK_ORDERS_FILE",
            &config.data.orders_file,
            config.data.orders_path(),
        ),
        (
            "data.products_file",
            "SHOPDESK_PRODUCTS_FILE",
            &config.data.products_file,
            config.data.products_path(),
        ),
        ("data.faqs_file", "SHOPDESK_FAQS_FILE", &config.data.faqs_file, config.data.faqs_path()),
    ] {
        lines.push(render_line(
            key_path,
            &format!("{value} -> {}", describe_path(&path)),
            file.source(FieldSpec { key_path, env_keys: &[env_key], overridden: false }),
        ));
    }

    lines.push(render_line(
        "resolver.max_recommendations",
        &config.resolver.max_recommendations.to_string(),
        file.source(FieldSpec {
            key_path: "resolver.max_recommendations",
            env_keys: &["SHOPDESK_MAX_RECOMMENDATIONS"],
            overridden: options.overrides.max_recommendations.is_some(),
        }),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        file.source(FieldSpec {
            key_path: "logging.level",
            env_keys: &["SHOPDESK_LOGGING_LEVEL", "SHOPDESK_LOG_LEVEL"],
            overridden: options.overrides.log_level.is_some(),
        }),
    ));
    lines.push(render_line(
        "logging.format",
        config.logging.format.as_str(),
        file.source(FieldSpec {
            key_path: "logging.format",
            env_keys: &["SHOPDESK_LOGGING_FORMAT", "SHOPDESK_LOG_FORMAT"],
            overridden: options.overrides.log_format.is_some(),
        }),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

impl ConfigFile {
    /// Highest-precedence source that set the field.
    fn source(&self, spec: FieldSpec<'_>) -> String {
        if spec.overridden {
            return "flag".to_string();
        }

        for env_key in spec.env_keys {
            if read_env(env_key).is_some() {
                return format!("env ({env_key})");
            }
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, spec.key_path) {
                let file_path = self
                    .path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn describe_path(path: &Path) -> String {
    let marker = if path.is_file() { "" } else { " (missing)" };
    format!("{}{marker}", path.display())
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
