use regex::Regex;
use shopdesk_core::{ClassificationResult, Entities, Intent, IntentLexicon};

use crate::errors::AgentError;

/// Openers that classify a message as a greeting no matter what follows.
pub const GREETING_PREFIXES: [&str; 6] =
    ["hi", "hello", "hey", "good morning", "good evening", "good afternoon"];

const ORDER_ID_PATTERN: &str = r"(?i)\bord\d+\b";

/// Keyword classifier over normalized text.
///
/// Rules apply in a fixed order: greeting prefix, lexicon scan, entity
/// extraction, then intent inference from a lone order id.
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    lexicon: IntentLexicon,
    order_id_pattern: Regex,
    categories: Vec<(String, Regex)>,
}

impl IntentClassifier {
    pub fn new(lexicon: IntentLexicon) -> Result<Self, AgentError> {
        let order_id_pattern = Regex::new(ORDER_ID_PATTERN)?;
        Ok(Self { lexicon, order_id_pattern, categories: Vec::new() })
    }

    /// Enables `category` extraction for the given vocabulary. Earlier
    /// categories win when several appear in one message.
    pub fn with_categories<I>(mut self, categories: I) -> Result<Self, AgentError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut compiled = Vec::new();
        for category in categories {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(&category));
            compiled.push((category, Regex::new(&pattern)?));
        }
        self.categories = compiled;
        Ok(self)
    }

    pub fn lexicon(&self) -> &IntentLexicon {
        &self.lexicon
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        if is_greeting(text) {
            return ClassificationResult::new(Intent::Greet, Entities::default());
        }

        let mut intent = self.match_lexicon(text).unwrap_or(Intent::Unknown);
        let entities = Entities {
            order_id: self.extract_order_id(text),
            category: self.extract_category(text),
        };

        if intent == Intent::Unknown && entities.order_id.is_some() {
            intent = Intent::ProvideOrderId;
        }

        ClassificationResult::new(intent, entities)
    }

    fn match_lexicon(&self, text: &str) -> Option<Intent> {
        self.lexicon
            .entries()
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|phrase| text.contains(phrase.as_str())))
            .map(|(intent, _)| *intent)
    }

    /// Leftmost match only; later order-like tokens are ignored.
    fn extract_order_id(&self, text: &str) -> Option<String> {
        self.order_id_pattern.find(text).map(|found| found.as_str().to_ascii_uppercase())
    }

    fn extract_category(&self, text: &str) -> Option<String> {
        self.categories
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(category, _)| category.clone())
    }
}

/// The greeting must end at a word boundary: `hi, there` greets, `history` does not.
fn is_greeting(text: &str) -> bool {
    GREETING_PREFIXES.iter().any(|greeting| {
        text.strip_prefix(greeting)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric()))
    })
}
