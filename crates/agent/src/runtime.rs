use serde::Serialize;
use shopdesk_core::{ClassificationResult, Intent, ReferenceData};
use tracing::debug;
use uuid::Uuid;

use crate::conversation::IntentClassifier;
use crate::errors::AgentError;
use crate::preprocess::{Preprocessor, REJECTED_INPUT_REPLY};
use crate::responses::ResponseGenerator;
use crate::rules::{ResolvedOutcome, RuleResolver, DEFAULT_MAX_RECOMMENDATIONS};

/// Everything that happened to one message on its way to a reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub correlation_id: String,
    pub input: String,
    pub normalized: Option<String>,
    pub classification: Option<ClassificationResult>,
    pub resolved_intent: Option<Intent>,
    pub outcome: Option<ResolvedOutcome>,
    pub reply: String,
}

/// The request pipeline: preprocess, classify, correct the intent, resolve,
/// render. Holds only immutable state, so one instance can serve any
/// number of turns.
#[derive(Debug)]
pub struct AgentRuntime {
    reference: ReferenceData,
    preprocessor: Preprocessor,
    classifier: IntentClassifier,
    responses: ResponseGenerator,
    max_recommendations: usize,
}

impl AgentRuntime {
    pub fn new(reference: ReferenceData) -> Result<Self, AgentError> {
        let classifier = IntentClassifier::new(reference.lexicon.clone())?
            .with_categories(reference.knowledge.categories())?;
        Ok(Self {
            reference,
            preprocessor: Preprocessor::new(),
            classifier,
            responses: ResponseGenerator::new()?,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        })
    }

    pub fn with_max_recommendations(mut self, max_recommendations: usize) -> Self {
        self.max_recommendations = max_recommendations;
        self
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn resolver(&self) -> RuleResolver<'_> {
        RuleResolver::new(&self.reference.knowledge)
            .with_max_recommendations(self.max_recommendations)
    }

    pub fn respond(&self, input: &str) -> String {
        self.handle(input).reply
    }

    pub fn handle(&self, input: &str) -> Turn {
        let correlation_id = Uuid::new_v4().to_string();

        let Some(normalized) = self.preprocessor.process(input) else {
            debug!(
                event_name = "agent.turn.rejected",
                correlation_id = correlation_id.as_str(),
                "message rejected before classification"
            );
            return Turn {
                correlation_id,
                input: input.to_string(),
                normalized: None,
                classification: None,
                resolved_intent: None,
                outcome: None,
                reply: REJECTED_INPUT_REPLY.to_string(),
            };
        };

        let classification = self.classifier.classify(&normalized);
        let resolved_intent = correct_intent(classification.intent);
        let outcome = self.resolver().resolve(resolved_intent, &classification.entities);
        let reply = self.responses.generate(&outcome);

        debug!(
            event_name = "agent.turn.resolved",
            correlation_id = correlation_id.as_str(),
            classified_intent = classification.intent.tag(),
            resolved_intent = resolved_intent.tag(),
            order_id = classification.entities.order_id.as_deref().unwrap_or("none"),
            category = classification.entities.category.as_deref().unwrap_or("none"),
            understood = outcome.is_understood(),
            "message resolved"
        );

        Turn {
            correlation_id,
            input: input.to_string(),
            normalized: Some(normalized),
            classification: Some(classification),
            resolved_intent: Some(resolved_intent),
            outcome: Some(outcome),
            reply,
        }
    }
}

/// A bare order id means "track my order". Every other intent passes
/// through untouched.
pub fn correct_intent(intent: Intent) -> Intent {
    match intent {
        Intent::ProvideOrderId => Intent::TrackOrder,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopdesk_core::{
        Entities, Intent, IntentLexicon, KnowledgeBase, Order, OrderId, Product, ProductId,
        ReferenceData,
    };

    use super::{correct_intent, AgentRuntime};
    use crate::preprocess::REJECTED_INPUT_REPLY;
    use crate::responses::NOT_UNDERSTOOD_REPLIES;
    use crate::rules::GREETING_TEXT;

    fn phrases(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn runtime() -> AgentRuntime {
        let lexicon = IntentLexicon::new(vec![
            (Intent::TrackOrder, phrases(&["track", "where is my order", "order status"])),
            (Intent::ReturnPolicy, phrases(&["return", "refund"])),
            (Intent::ProductRecommendation, phrases(&["recommend", "suggest"])),
        ]);
        let knowledge = KnowledgeBase::new(
            vec![Order {
                id: OrderId("ORD1234".to_string()),
                status: "shipped".to_string(),
                delivery_date: Some("2024-01-01".to_string()),
                return_days: Some(14),
            }],
            vec![
                Product {
                    id: ProductId("P1".to_string()),
                    name: "Wireless Earbuds".to_string(),
                    price: Decimal::new(4_999, 2),
                    category: Some("electronics".to_string()),
                },
                Product {
                    id: ProductId("P2".to_string()),
                    name: "Chef Knife".to_string(),
                    price: Decimal::new(35, 0),
                    category: Some("kitchen".to_string()),
                },
            ],
            Vec::new(),
        );
        AgentRuntime::new(ReferenceData::new(lexicon, knowledge)).expect("runtime should build")
    }

    #[test]
    fn correction_only_rewrites_provide_order_id() {
        assert_eq!(correct_intent(Intent::ProvideOrderId), Intent::TrackOrder);
        for intent in [
            Intent::Greet,
            Intent::TrackOrder,
            Intent::ReturnPolicy,
            Intent::ProductRecommendation,
            Intent::Unknown,
        ] {
            assert_eq!(correct_intent(intent), intent);
        }
    }

    #[test]
    fn bare_order_id_is_tracked() {
        let turn = runtime().handle("ORD1234");

        let classification = turn.classification.expect("classified");
        assert_eq!(classification.intent, Intent::ProvideOrderId);
        assert_eq!(classification.entities, Entities::with_order_id("ORD1234"));
        assert_eq!(turn.resolved_intent, Some(Intent::TrackOrder));
        assert_eq!(
            turn.reply,
            "✅ Here's the update for your order:\n\
             Order #ORD1234 is currently 'shipped'. Expected delivery: 2024-01-01."
        );
    }

    #[test]
    fn greeting_wins_over_an_embedded_request() {
        let turn = runtime().handle("Hello, where is my order ORD1234?");
        assert_eq!(turn.resolved_intent, Some(Intent::Greet));
        assert_eq!(turn.reply, GREETING_TEXT);
    }

    #[test]
    fn words_starting_with_a_greeting_are_not_greetings() {
        let turn = runtime().handle("history of ORD1234");
        assert_eq!(turn.resolved_intent, Some(Intent::TrackOrder));
        assert!(turn.reply.contains("Order #ORD1234 is currently 'shipped'."), "{}", turn.reply);
    }

    #[test]
    fn category_filters_recommendations_end_to_end() {
        let reply = runtime().respond("Can you recommend some kitchen gear?");
        assert_eq!(
            reply,
            "💡 Recommended products:\nHere are some recommendations:\nChef Knife ($35)"
        );
    }

    #[test]
    fn order_specific_return_window() {
        let reply = runtime().respond("I want to return ord1234");
        assert!(reply.contains("within 14 days"), "{reply}");
    }

    #[test]
    fn rejected_input_never_reaches_the_classifier() {
        let turn = runtime().handle("  ?!  ");
        assert_eq!(turn.reply, REJECTED_INPUT_REPLY);
        assert_eq!(turn.normalized, None);
        assert_eq!(turn.classification, None);
    }

    #[test]
    fn unmatched_text_gets_a_not_understood_variant() {
        let reply = runtime().respond("what's the weather like");
        assert!(NOT_UNDERSTOOD_REPLIES.contains(&reply.as_str()), "{reply}");
    }

    #[test]
    fn turns_get_distinct_correlation_ids() {
        let runtime = runtime();
        assert_ne!(runtime.handle("track").correlation_id, runtime.handle("track").correlation_id);
    }
}
