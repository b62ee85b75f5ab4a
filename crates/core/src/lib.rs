pub mod config;
pub mod domain;
pub mod errors;
pub mod knowledge;

pub use domain::intent::{ClassificationResult, Entities, Intent, IntentLexicon};
pub use domain::order::{Order, OrderId, DEFAULT_RETURN_DAYS};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DataError};
pub use knowledge::{KnowledgeBase, LoadReport, ReferenceData};
