use std::time::Instant;

use serde::Serialize;
use shopdesk_agent::preprocess::REJECTED_INPUT_REPLY;
use shopdesk_agent::rules::{GREETING_TEXT, NO_RECOMMENDATIONS_TEXT};
use shopdesk_agent::AgentRuntime;
use shopdesk_core::config::{AppConfig, LoadOptions};
use shopdesk_core::{Entities, Intent, ReferenceData};

use crate::commands::CommandResult;

const SAMPLE_ORDER_ID: &str = "ORD0000";
const CONVERSATION_CHECKS: [&str; 4] =
    ["greeting_turn", "rejected_input_turn", "order_id_turn", "recommendation_cap"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(options.clone())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.push(skipped("reference_data"));
            checks.push(skipped("agent_pipeline"));
            checks.extend(CONVERSATION_CHECKS.into_iter().map(skipped));
            return finalize_report(checks, elapsed_since(started));
        }
    };

    let load_started = Instant::now();
    let reference = ReferenceData::load(&config.data);
    let degraded = reference
        .report
        .collections
        .iter()
        .filter(|status| !status.is_loaded())
        .map(|status| status.kind.name())
        .collect::<Vec<_>>();
    checks.push(SmokeCheck {
        name: "reference_data",
        status: if degraded.is_empty() { SmokeStatus::Pass } else { SmokeStatus::Fail },
        elapsed_ms: elapsed_since(load_started),
        message: if degraded.is_empty() {
            format!(
                "{} orders, {} products, {} faqs, {} intents loaded",
                reference.knowledge.order_count(),
                reference.knowledge.product_count(),
                reference.knowledge.faq_count(),
                reference.lexicon.len()
            )
        } else {
            format!("collections served empty: {}", degraded.join(", "))
        },
    });

    let runtime = match timed_check(|| AgentRuntime::new(reference)) {
        Ok((elapsed_ms, runtime)) => {
            checks.push(SmokeCheck {
                name: "agent_pipeline",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "classifier patterns and reply templates compiled".to_string(),
            });
            runtime.with_max_recommendations(config.resolver.max_recommendations)
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "agent_pipeline",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.extend(CONVERSATION_CHECKS.into_iter().map(skipped));
            return finalize_report(checks, elapsed_since(started));
        }
    };

    checks.push(conversation_check("greeting_turn", || {
        let reply = runtime.respond("Hello there");
        if reply == GREETING_TEXT {
            Ok("greeting answered with the capability overview".to_string())
        } else {
            Err(format!("unexpected greeting reply: {reply}"))
        }
    }));

    checks.push(conversation_check("rejected_input_turn", || {
        let reply = runtime.respond("?!");
        if reply == REJECTED_INPUT_REPLY {
            Ok("symbol-only input rejected before classification".to_string())
        } else {
            Err(format!("symbol-only input was not rejected: {reply}"))
        }
    }));

    checks.push(conversation_check("order_id_turn", || {
        let turn = runtime.handle(SAMPLE_ORDER_ID);
        let echoed = turn.reply.contains(&format!("#{SAMPLE_ORDER_ID}"));
        if turn.resolved_intent == Some(Intent::TrackOrder) && echoed {
            Ok(format!("bare `{SAMPLE_ORDER_ID}` routed to order tracking"))
        } else {
            Err(format!("bare order id was not tracked: {}", turn.reply))
        }
    }));

    checks.push(conversation_check("recommendation_cap", || {
        let max = config.resolver.max_recommendations;
        let outcome =
            runtime.resolver().resolve(Intent::ProductRecommendation, &Entities::default());
        let listed = outcome.text.lines().skip(1).count();
        if outcome.text == NO_RECOMMENDATIONS_TEXT {
            Ok("catalog is empty; fallback text returned".to_string())
        } else if listed <= max {
            Ok(format!("{listed} products listed (cap {max})"))
        } else {
            Err(format!("{listed} products listed, above the cap of {max}"))
        }
    }));

    finalize_report(checks, elapsed_since(started))
}

fn conversation_check(
    name: &'static str,
    check: impl FnOnce() -> Result<String, String>,
) -> SmokeCheck {
    match timed_check(check) {
        Ok((elapsed_ms, message)) => {
            SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message }
        }
        Err((elapsed_ms, message)) => {
            SmokeCheck { name, status: SmokeStatus::Fail, elapsed_ms, message }
        }
    }
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((elapsed_since(started), value)),
        Err(error) => Err((elapsed_since(started), error)),
    }
}

fn elapsed_since(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
