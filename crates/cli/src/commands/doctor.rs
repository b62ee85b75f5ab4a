use serde::Serialize;
use shopdesk_agent::AgentRuntime;
use shopdesk_core::config::{AppConfig, LoadOptions};
use shopdesk_core::knowledge::{CollectionKind, CollectionStatus};
use shopdesk_core::ReferenceData;

use crate::commands::CommandResult;

const COLLECTION_CHECKS: [(CollectionKind, &str); 4] = [
    (CollectionKind::Intents, "intents_data"),
    (CollectionKind::Orders, "orders_data"),
    (CollectionKind::Products, "products_data"),
    (CollectionKind::Faqs, "faqs_data"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            let reference = ReferenceData::load(&config.data);
            for (kind, name) in COLLECTION_CHECKS {
                checks.push(check_collection(name, reference.report.status(kind)));
            }
            checks.push(check_lexicon(&reference));
            checks.push(check_pipeline(reference));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for (_, name) in COLLECTION_CHECKS {
                checks.push(skipped(name));
            }
            checks.push(skipped("intent_lexicon"));
            checks.push(skipped("agent_pipeline"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_collection(name: &'static str, status: Option<&CollectionStatus>) -> DoctorCheck {
    match status {
        Some(status) if status.is_loaded() => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("loaded {} entries from `{}`", status.entries, status.path.display()),
        },
        Some(status) => DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!(
                "{} ({}); serving an empty collection",
                status.error.as_deref().unwrap_or("load failed"),
                status.error_class.unwrap_or("data_error")
            ),
        },
        None => DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: "collection was not attempted".to_string(),
        },
    }
}

fn check_lexicon(reference: &ReferenceData) -> DoctorCheck {
    let skipped_tags = &reference.report.skipped_intent_tags;
    if reference.lexicon.is_empty() {
        return DoctorCheck {
            name: "intent_lexicon",
            status: CheckStatus::Fail,
            details: "no selectable intents; every non-greeting message will be unknown"
                .to_string(),
        };
    }

    if !skipped_tags.is_empty() {
        return DoctorCheck {
            name: "intent_lexicon",
            status: CheckStatus::Fail,
            details: format!("unusable intent tags skipped: {}", skipped_tags.join(", ")),
        };
    }

    DoctorCheck {
        name: "intent_lexicon",
        status: CheckStatus::Pass,
        details: format!("{} intents carry trigger phrases", reference.lexicon.len()),
    }
}

fn check_pipeline(reference: ReferenceData) -> DoctorCheck {
    match AgentRuntime::new(reference) {
        Ok(_) => DoctorCheck {
            name: "agent_pipeline",
            status: CheckStatus::Pass,
            details: "classifier patterns and reply templates compiled".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "agent_pipeline",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
