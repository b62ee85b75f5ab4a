use rand::seq::SliceRandom;
use rand::Rng;
use shopdesk_core::Intent;
use tera::{Context, Tera};
use tracing::warn;

use crate::errors::AgentError;
use crate::rules::ResolvedOutcome;

pub const NOT_UNDERSTOOD_REPLIES: [&str; 3] = [
    "I'm sorry, I didn't quite get that. Can you please rephrase?",
    "Hmm, I couldn't understand. Could you clarify?",
    "Oops! I didn't understand that. Try asking about orders, returns, or products.",
];

const REPLY_TEMPLATES: [(&str, &str); 3] = [
    ("track_order", "✅ Here's the update for your order:\n{{ outcome }}"),
    ("return_policy", "📦 Return/Refund Info:\n{{ outcome }}"),
    ("product_recommendation", "💡 Recommended products:\n{{ outcome }}"),
];

/// Turns resolver output into the reply shown to the customer.
#[derive(Clone, Debug)]
pub struct ResponseGenerator {
    templates: Tera,
}

impl ResponseGenerator {
    pub fn new() -> Result<Self, AgentError> {
        let mut templates = Tera::default();
        for (name, body) in REPLY_TEMPLATES {
            templates
                .add_raw_template(name, body)
                .map_err(|source| AgentError::Template { name, source })?;
        }
        Ok(Self { templates })
    }

    pub fn generate(&self, outcome: &ResolvedOutcome) -> String {
        self.generate_with_rng(outcome, &mut rand::thread_rng())
    }

    /// Same as [`generate`](Self::generate) with the caller's RNG picking
    /// among the "not understood" variants.
    pub fn generate_with_rng<R>(&self, outcome: &ResolvedOutcome, rng: &mut R) -> String
    where
        R: Rng + ?Sized,
    {
        if !outcome.is_understood() {
            let reply = NOT_UNDERSTOOD_REPLIES.choose(rng).copied();
            return reply.unwrap_or(NOT_UNDERSTOOD_REPLIES[0]).to_string();
        }

        let Some(template) = template_name(outcome.intent) else {
            return outcome.text.clone();
        };

        let mut context = Context::new();
        context.insert("outcome", &outcome.text);
        match self.templates.render(template, &context) {
            Ok(reply) => reply,
            Err(error) => {
                warn!(
                    event_name = "agent.reply.template_failed",
                    template,
                    error = %error,
                    "reply template failed to render, sending undecorated outcome"
                );
                outcome.text.clone()
            }
        }
    }
}

fn template_name(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::TrackOrder => Some("track_order"),
        Intent::ReturnPolicy => Some("return_policy"),
        Intent::ProductRecommendation => Some("product_recommendation"),
        Intent::Greet | Intent::ProvideOrderId | Intent::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shopdesk_core::Intent;

    use super::{ResponseGenerator, NOT_UNDERSTOOD_REPLIES};
    use crate::rules::ResolvedOutcome;

    fn outcome(intent: Intent, text: &str) -> ResolvedOutcome {
        ResolvedOutcome { intent, text: text.to_string() }
    }

    fn generator() -> ResponseGenerator {
        ResponseGenerator::new().expect("templates should compile")
    }

    #[test]
    fn decorates_order_updates_without_escaping() {
        let reply = generator().generate(&outcome(
            Intent::TrackOrder,
            "Order #ORD1234 is currently 'shipped'. Expected delivery: 2024-01-01.",
        ));
        assert_eq!(
            reply,
            "✅ Here's the update for your order:\n\
             Order #ORD1234 is currently 'shipped'. Expected delivery: 2024-01-01."
        );
    }

    #[test]
    fn decorates_returns_and_recommendations() {
        let generator = generator();
        let returns = generator.generate(&outcome(Intent::ReturnPolicy, "30 days."));
        assert_eq!(returns, "📦 Return/Refund Info:\n30 days.");

        let products = generator.generate(&outcome(
            Intent::ProductRecommendation,
            "Here are some recommendations:\nMug ($8)",
        ));
        assert_eq!(products, "💡 Recommended products:\nHere are some recommendations:\nMug ($8)");
    }

    #[test]
    fn greeting_passes_through_unchanged() {
        let reply = generator().generate(&outcome(Intent::Greet, "Hello!"));
        assert_eq!(reply, "Hello!");
    }

    #[test]
    fn unknown_or_empty_outcomes_pick_a_fixed_variant() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let unknown =
                generator.generate_with_rng(&outcome(Intent::Unknown, "ignored"), &mut rng);
            assert!(NOT_UNDERSTOOD_REPLIES.contains(&unknown.as_str()));

            let empty = generator.generate_with_rng(&outcome(Intent::TrackOrder, ""), &mut rng);
            assert!(NOT_UNDERSTOOD_REPLIES.contains(&empty.as_str()));
        }
    }

    #[test]
    fn seeded_rng_makes_variant_choice_reproducible() {
        let generator = generator();
        let unknown = outcome(Intent::Unknown, "");
        let first = generator.generate_with_rng(&unknown, &mut StdRng::seed_from_u64(42));
        let second = generator.generate_with_rng(&unknown, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
