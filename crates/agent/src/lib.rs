//! Agent Runtime - rule-based intent handling for customer support chat
//!
//! This crate turns one customer message into one reply:
//! - Validates and normalizes the raw text (`preprocess`)
//! - Classifies it into an intent and extracts entities (`conversation`)
//! - Rewrites a bare order id into an order-tracking request (`runtime`)
//! - Resolves the intent against the knowledge base (`rules`)
//! - Renders the customer-facing reply (`responses`)
//!
//! # Key Types
//!
//! - `AgentRuntime` - Pipeline controller (see `runtime` module)
//! - `IntentClassifier` - Greeting check, trigger phrases, entity patterns
//! - `RuleResolver` - Deterministic business rules per intent
//!
//! # Determinism
//!
//! Classification and resolution are pure functions of the message and the
//! reference data loaded at startup. The only randomness is the choice among
//! "not understood" reply variants.

pub mod conversation;
pub mod errors;
pub mod preprocess;
pub mod responses;
pub mod rules;
pub mod runtime;

pub use conversation::IntentClassifier;
pub use errors::AgentError;
pub use preprocess::Preprocessor;
pub use responses::ResponseGenerator;
pub use rules::{ResolvedOutcome, RuleResolver};
pub use runtime::{AgentRuntime, Turn};
