/// Reply used when a message is rejected before classification.
pub const REJECTED_INPUT_REPLY: &str = "⚠️ Sorry, I didn't understand that. Please try again.";

/// Validates and normalizes raw user text into the form the classifier
/// expects: lowercase ASCII letters and digits, `,.!?`, single spaces.
#[derive(Clone, Debug, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Rejects empty text and text without a single letter or digit.
    pub fn validate(&self, text: &str) -> bool {
        text.chars().any(char::is_alphanumeric)
    }

    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let mut sanitized = String::with_capacity(lowered.len());
        for character in lowered.chars() {
            if is_kept(character) {
                sanitized.push(character);
            } else {
                sanitized.push(' ');
            }
        }
        sanitized.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// `None` when the text is rejected or normalizes to nothing.
    pub fn process(&self, text: &str) -> Option<String> {
        if !self.validate(text) {
            return None;
        }
        let normalized = self.normalize(text);
        (!normalized.is_empty()).then_some(normalized)
    }
}

fn is_kept(character: char) -> bool {
    character.is_ascii_lowercase()
        || character.is_ascii_digit()
        || character.is_whitespace()
        || matches!(character, ',' | '.' | '!' | '?')
}
