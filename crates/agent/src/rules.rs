use serde::Serialize;
use shopdesk_core::knowledge::RETURN_POLICY_TOPIC;
use shopdesk_core::{Entities, Intent, KnowledgeBase};

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;

pub const GREETING_TEXT: &str = "Hello! I can help you track an order, explain our return policy, \
     or recommend products. What would you like to do?";
pub const MISSING_ORDER_ID_TEXT: &str = "Please provide a valid order ID.";
pub const DEFAULT_RETURN_POLICY_TEXT: &str =
    "Our standard return policy allows returns within 7 days of delivery.";
pub const NO_RECOMMENDATIONS_TEXT: &str = "Sorry, we have no products to recommend right now.";
pub const NOT_UNDERSTOOD_TEXT: &str = "Sorry, I could not understand your request. \
     Please try again or ask about orders, returns, or products.";

const RECOMMENDATIONS_HEADER: &str = "Here are some recommendations:";
const MISSING_DELIVERY_DATE: &str = "N/A";

/// Result of rule resolution. `intent` selects the reply template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedOutcome {
    pub intent: Intent,
    pub text: String,
}

impl ResolvedOutcome {
    fn new(intent: Intent, text: impl Into<String>) -> Self {
        Self { intent, text: text.into() }
    }

    pub fn is_understood(&self) -> bool {
        self.intent != Intent::Unknown && !self.text.is_empty()
    }
}

/// Business rules over the knowledge base. Every expected condition
/// (missing entity, unknown order, empty catalog) maps to reply text;
/// resolution never fails and never varies for the same input.
#[derive(Clone, Copy, Debug)]
pub struct RuleResolver<'a> {
    knowledge: &'a KnowledgeBase,
    max_recommendations: usize,
}

impl<'a> RuleResolver<'a> {
    pub fn new(knowledge: &'a KnowledgeBase) -> Self {
        Self { knowledge, max_recommendations: DEFAULT_MAX_RECOMMENDATIONS }
    }

    pub fn with_max_recommendations(mut self, max_recommendations: usize) -> Self {
        self.max_recommendations = max_recommendations;
        self
    }

    pub fn resolve(&self, intent: Intent, entities: &Entities) -> ResolvedOutcome {
        match intent {
            Intent::Greet => ResolvedOutcome::new(Intent::Greet, GREETING_TEXT),
            // Unreachable through `AgentRuntime`, which rewrites this tag
            // first. Kept for callers that skip the pipeline.
            Intent::ProvideOrderId | Intent::TrackOrder => {
                ResolvedOutcome::new(Intent::TrackOrder, self.track_order(entities))
            }
            Intent::ReturnPolicy => {
                ResolvedOutcome::new(Intent::ReturnPolicy, self.return_policy(entities))
            }
            Intent::ProductRecommendation => ResolvedOutcome::new(
                Intent::ProductRecommendation,
                self.recommend_products(entities),
            ),
            Intent::Unknown => ResolvedOutcome::new(Intent::Unknown, NOT_UNDERSTOOD_TEXT),
        }
    }

    fn track_order(&self, entities: &Entities) -> String {
        let Some(order_id) = entities.order_id.as_deref() else {
            return MISSING_ORDER_ID_TEXT.to_string();
        };

        match self.knowledge.lookup_order(order_id) {
            Some(order) => format!(
                "Order #{order_id} is currently '{}'. Expected delivery: {}.",
                order.status,
                order.delivery_date.as_deref().unwrap_or(MISSING_DELIVERY_DATE)
            ),
            None => format!("Order #{order_id} was not found in our system."),
        }
    }

    fn return_policy(&self, entities: &Entities) -> String {
        let order = entities.order_id.as_deref().and_then(|id| self.knowledge.lookup_order(id));
        if let Some(order) = order {
            return format!(
                "You can return Order #{} within {} days of delivery.",
                order.id.as_str(),
                order.return_window_days()
            );
        }

        self.knowledge
            .lookup_faq(RETURN_POLICY_TOPIC)
            .unwrap_or(DEFAULT_RETURN_POLICY_TEXT)
            .to_string()
    }

    fn recommend_products(&self, entities: &Entities) -> String {
        let lines = self
            .knowledge
            .list_products(entities.category.as_deref())
            .take(self.max_recommendations)
            .map(|product| product.display_line())
            .collect::<Vec<_>>();

        if lines.is_empty() {
            return NO_RECOMMENDATIONS_TEXT.to_string();
        }

        format!("{RECOMMENDATIONS_HEADER}\n{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopdesk_core::{Entities, Intent, KnowledgeBase, Order, OrderId, Product, ProductId};

    use super::{
        RuleResolver, DEFAULT_RETURN_POLICY_TEXT, GREETING_TEXT, MISSING_ORDER_ID_TEXT,
        NOT_UNDERSTOOD_TEXT, NO_RECOMMENDATIONS_TEXT,
    };

    fn order(
        id: &str,
        status: &str,
        delivery_date: Option<&str>,
        return_days: Option<u32>,
    ) -> Order {
        Order {
            id: OrderId(id.to_string()),
            status: status.to_string(),
            delivery_date: delivery_date.map(str::to_string),
            return_days,
        }
    }

    fn product(index: usize, category: &str) -> Product {
        Product {
            id: ProductId(format!("P{index}")),
            name: format!("Gadget {index}"),
            price: Decimal::new(1_999 + index as i64 * 100, 2),
            category: Some(category.to_string()),
        }
    }

    fn knowledge(faqs: Vec<(String, String)>) -> KnowledgeBase {
        let mut products = (1..=7).map(|index| product(index, "electronics")).collect::<Vec<_>>();
        products.insert(2, product(99, "kitchen"));
        KnowledgeBase::new(
            vec![
                order("ORD1234", "shipped", Some("2024-01-01"), None),
                order("ORD5678", "processing", None, Some(30)),
            ],
            products,
            faqs,
        )
    }

    #[test]
    fn greet_ignores_entities() {
        let knowledge = knowledge(Vec::new());
        let outcome =
            RuleResolver::new(&knowledge).resolve(Intent::Greet, &Entities::with_order_id("ORD1"));
        assert_eq!(outcome.intent, Intent::Greet);
        assert_eq!(outcome.text, GREETING_TEXT);
    }

    #[test]
    fn track_order_reports_status_and_delivery_date() {
        let knowledge = knowledge(Vec::new());
        let resolver = RuleResolver::new(&knowledge);

        let outcome = resolver.resolve(Intent::TrackOrder, &Entities::with_order_id("ORD1234"));
        assert_eq!(
            outcome.text,
            "Order #ORD1234 is currently 'shipped'. Expected delivery: 2024-01-01."
        );

        let pending = resolver.resolve(Intent::TrackOrder, &Entities::with_order_id("ORD5678"));
        assert!(pending.text.ends_with("Expected delivery: N/A."));
    }

    #[test]
    fn track_order_miss_echoes_the_id() {
        let knowledge = knowledge(Vec::new());
        let outcome = RuleResolver::new(&knowledge)
            .resolve(Intent::TrackOrder, &Entities::with_order_id("ORD9999"));
        assert_eq!(outcome.text, "Order #ORD9999 was not found in our system.");
    }

    #[test]
    fn track_order_without_id_asks_for_one() {
        let knowledge = knowledge(Vec::new());
        let outcome =
            RuleResolver::new(&knowledge).resolve(Intent::TrackOrder, &Entities::default());
        assert_eq!(outcome.text, MISSING_ORDER_ID_TEXT);
    }

    #[test]
    fn provide_order_id_resolves_like_track_order() {
        let knowledge = knowledge(Vec::new());
        let resolver = RuleResolver::new(&knowledge);
        let entities = Entities::with_order_id("ORD1234");

        let direct = resolver.resolve(Intent::ProvideOrderId, &entities);
        assert_eq!(direct, resolver.resolve(Intent::TrackOrder, &entities));
        assert_eq!(direct.intent, Intent::TrackOrder);
    }

    #[test]
    fn return_policy_uses_order_specific_window() {
        let knowledge = knowledge(Vec::new());
        let resolver = RuleResolver::new(&knowledge);

        let custom = resolver.resolve(Intent::ReturnPolicy, &Entities::with_order_id("ORD5678"));
        assert_eq!(custom.text, "You can return Order #ORD5678 within 30 days of delivery.");

        let defaulted = resolver.resolve(Intent::ReturnPolicy, &Entities::with_order_id("ORD1234"));
        assert_eq!(defaulted.text, "You can return Order #ORD1234 within 7 days of delivery.");
    }

    #[test]
    fn return_policy_falls_back_to_faq_then_default() {
        let with_faq = knowledge(vec![(
            "return_policy".to_string(),
            "Returns are accepted within 14 days.".to_string(),
        )]);
        let outcome = RuleResolver::new(&with_faq)
            .resolve(Intent::ReturnPolicy, &Entities::with_order_id("ORD0000"));
        assert_eq!(outcome.text, "Returns are accepted within 14 days.");

        let without_faq = knowledge(Vec::new());
        let outcome =
            RuleResolver::new(&without_faq).resolve(Intent::ReturnPolicy, &Entities::default());
        assert_eq!(outcome.text, DEFAULT_RETURN_POLICY_TEXT);
    }

    #[test]
    fn recommendations_are_capped_and_in_catalog_order() {
        let knowledge = knowledge(Vec::new());
        let outcome = RuleResolver::new(&knowledge)
            .resolve(Intent::ProductRecommendation, &Entities::with_category("electronics"));

        let lines = outcome.text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Here are some recommendations:");
        assert_eq!(
            &lines[1..],
            &[
                "Gadget 1 ($20.99)",
                "Gadget 2 ($21.99)",
                "Gadget 3 ($22.99)",
                "Gadget 4 ($23.99)",
                "Gadget 5 ($24.99)",
            ]
        );
    }

    #[test]
    fn recommendations_without_category_cover_the_whole_catalog() {
        let knowledge = knowledge(Vec::new());
        let outcome = RuleResolver::new(&knowledge)
            .with_max_recommendations(3)
            .resolve(Intent::ProductRecommendation, &Entities::default());

        assert_eq!(outcome.text.lines().count(), 4);
        assert!(outcome.text.contains("Gadget 99 ($118.99)"));
    }

    #[test]
    fn empty_catalog_or_unmatched_category_has_nothing_to_recommend() {
        let empty = KnowledgeBase::default();
        let outcome =
            RuleResolver::new(&empty).resolve(Intent::ProductRecommendation, &Entities::default());
        assert_eq!(outcome.text, NO_RECOMMENDATIONS_TEXT);

        let knowledge = knowledge(Vec::new());
        let outcome = RuleResolver::new(&knowledge)
            .resolve(Intent::ProductRecommendation, &Entities::with_category("garden"));
        assert_eq!(outcome.text, NO_RECOMMENDATIONS_TEXT);
    }

    #[test]
    fn unknown_intent_is_not_understood() {
        let knowledge = knowledge(Vec::new());
        let outcome = RuleResolver::new(&knowledge).resolve(Intent::Unknown, &Entities::default());
        assert_eq!(outcome.text, NOT_UNDERSTOOD_TEXT);
        assert!(!outcome.is_understood());
    }

    #[test]
    fn resolution_is_idempotent() {
        let knowledge = knowledge(Vec::new());
        let resolver = RuleResolver::new(&knowledge);
        for intent in [Intent::TrackOrder, Intent::ReturnPolicy, Intent::ProductRecommendation] {
            let entities = Entities::with_order_id("ORD1234");
            assert_eq!(resolver.resolve(intent, &entities), resolver.resolve(intent, &entities));
        }
    }
}
