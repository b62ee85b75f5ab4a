use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of things a customer can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greet,
    TrackOrder,
    ReturnPolicy,
    ProductRecommendation,
    /// Transient: a bare order id with no keywords. Rewritten to
    /// `TrackOrder` before resolution.
    ProvideOrderId,
    Unknown,
}

impl Intent {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Greet => "greet",
            Self::TrackOrder => "track_order",
            Self::ReturnPolicy => "return_policy",
            Self::ProductRecommendation => "product_recommendation",
            Self::ProvideOrderId => "provide_order_id",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "greet" => Some(Self::Greet),
            "track_order" => Some(Self::TrackOrder),
            "return_policy" => Some(Self::ReturnPolicy),
            "product_recommendation" => Some(Self::ProductRecommendation),
            "provide_order_id" => Some(Self::ProvideOrderId),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Whether trigger phrases may select this intent. `ProvideOrderId` is
    /// only ever inferred from an extracted order id and `Unknown` is the
    /// absence of a match.
    pub fn is_lexicon_selectable(&self) -> bool {
        !matches!(self, Self::ProvideOrderId | Self::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Structured values pulled out of a message. A field is `Some` only when
/// extraction succeeded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Entities {
    pub fn with_order_id(order_id: impl Into<String>) -> Self {
        Self { order_id: Some(order_id.into()), ..Self::default() }
    }

    pub fn with_category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() && self.category.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub entities: Entities,
}

impl ClassificationResult {
    pub fn new(intent: Intent, entities: Entities) -> Self {
        Self { intent, entities }
    }
}

/// Trigger phrases per intent, in declaration order. Both the intent order
/// and the phrase order inside an intent decide which intent wins when
/// several phrases match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntentLexicon {
    entries: Vec<(Intent, Vec<String>)>,
}

impl IntentLexicon {
    pub fn new(entries: Vec<(Intent, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// Builds a lexicon from raw `(tag, phrases)` pairs, returning the tags
    /// that could not be used alongside it.
    pub fn from_tagged(entries: Vec<(String, Vec<String>)>) -> (Self, Vec<String>) {
        let mut accepted = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();

        for (tag, phrases) in entries {
            match Intent::from_tag(&tag) {
                Some(intent) if intent.is_lexicon_selectable() => {
                    let phrases =
                        phrases.into_iter().filter(|phrase| !phrase.is_empty()).collect();
                    accepted.push((intent, phrases));
                }
                _ => rejected.push(tag),
            }
        }

        (Self { entries: accepted }, rejected)
    }

    pub fn entries(&self) -> &[(Intent, Vec<String>)] {
        &self.entries
    }

    pub fn phrases(&self, intent: Intent) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == intent)
            .map(|(_, phrases)| phrases.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Entities, Intent, IntentLexicon};

    #[test]
    fn tags_round_trip_through_the_closed_set() {
        for intent in [
            Intent::Greet,
            Intent::TrackOrder,
            Intent::ReturnPolicy,
            Intent::ProductRecommendation,
            Intent::ProvideOrderId,
            Intent::Unknown,
        ] {
            assert_eq!(Intent::from_tag(intent.tag()), Some(intent));
        }
        assert_eq!(Intent::from_tag("cancel_order"), None);
    }

    #[test]
    fn lexicon_keeps_declaration_order_and_rejects_unusable_tags() {
        let (lexicon, rejected) = IntentLexicon::from_tagged(vec![
            ("return_policy".to_string(), vec!["return".to_string(), "refund".to_string()]),
            ("provide_order_id".to_string(), vec!["ord".to_string()]),
            ("track_order".to_string(), vec!["where is".to_string(), String::new()]),
            ("cancel_order".to_string(), vec!["cancel".to_string()]),
        ]);

        let order = lexicon.entries().iter().map(|(intent, _)| *intent).collect::<Vec<_>>();
        assert_eq!(order, vec![Intent::ReturnPolicy, Intent::TrackOrder]);
        assert_eq!(rejected, vec!["provide_order_id".to_string(), "cancel_order".to_string()]);
        assert_eq!(lexicon.phrases(Intent::TrackOrder), Some(&["where is".to_string()][..]));
    }

    #[test]
    fn entities_serialize_only_present_keys() {
        let entities = Entities::with_order_id("ORD1234");
        let json = serde_json::to_string(&entities).expect("entities serialize");
        assert_eq!(json, r#"{"order_id":"ORD1234"}"#);
        assert!(Entities::default().is_empty());
    }
}
