use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DataConfig;
use crate::domain::intent::IntentLexicon;
use crate::errors::DataError;
use crate::knowledge::{KnowledgeBase, OrderedEntries};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Intents,
    Orders,
    Products,
    Faqs,
}

impl CollectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Intents => "intents",
            Self::Orders => "orders",
            Self::Products => "products",
            Self::Faqs => "faqs",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    pub kind: CollectionKind,
    pub path: PathBuf,
    pub entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionStatus {
    pub fn is_loaded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of the startup load, one status per collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub collections: Vec<CollectionStatus>,
    pub skipped_intent_tags: Vec<String>,
    /// Upper-cased order ids that more than one source key mapped onto.
    pub merged_order_ids: Vec<String>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.collections.iter().all(CollectionStatus::is_loaded)
    }

    pub fn status(&self, kind: CollectionKind) -> Option<&CollectionStatus> {
        self.collections.iter().find(|status| status.kind == kind)
    }

    fn record<T>(
        &mut self,
        kind: CollectionKind,
        path: PathBuf,
        loaded: Result<OrderedEntries<T>, DataError>,
    ) -> OrderedEntries<T> {
        match loaded {
            Ok(entries) => {
                info!(
                    event_name = "system.data.collection_loaded",
                    collection = kind.name(),
                    path = %path.display(),
                    entries = entries.len(),
                    "reference data collection loaded"
                );
                self.collections.push(CollectionStatus {
                    kind,
                    path,
                    entries: entries.len(),
                    error_class: None,
                    error: None,
                });
                entries
            }
            Err(error) => {
                warn!(
                    event_name = "system.data.collection_degraded",
                    collection = kind.name(),
                    path = %path.display(),
                    error = %error,
                    "reference data collection unavailable, serving it empty"
                );
                self.collections.push(CollectionStatus {
                    kind,
                    path,
                    entries: 0,
                    error_class: Some(error.error_class()),
                    error: Some(error.to_string()),
                });
                OrderedEntries::default()
            }
        }
    }
}

/// Everything a conversation turn reads, built once before the first turn
/// and shared by reference afterwards.
#[derive(Clone, Debug, Default)]
pub struct ReferenceData {
    pub lexicon: IntentLexicon,
    pub knowledge: KnowledgeBase,
    pub report: LoadReport,
}

impl ReferenceData {
    pub fn new(lexicon: IntentLexicon, knowledge: KnowledgeBase) -> Self {
        Self { lexicon, knowledge, report: LoadReport::default() }
    }

    /// Loads all four collections. A collection that cannot be read or
    /// parsed is served empty and noted in the report; this never fails.
    pub fn load(config: &DataConfig) -> Self {
        let mut report = LoadReport::default();

        let intents_path = config.intents_path();
        let intents = report.record(
            CollectionKind::Intents,
            intents_path.clone(),
            load_collection::<Vec<String>>(&intents_path),
        );
        let orders_path = config.orders_path();
        let orders = report.record(
            CollectionKind::Orders,
            orders_path.clone(),
            load_collection(&orders_path),
        );
        let products_path = config.products_path();
        let products = report.record(
            CollectionKind::Products,
            products_path.clone(),
            load_collection(&products_path),
        );
        let faqs_path = config.faqs_path();
        let faqs =
            report.record(CollectionKind::Faqs, faqs_path.clone(), load_collection(&faqs_path));

        report.merged_order_ids = merged_order_ids(&orders);
        for id in &report.merged_order_ids {
            warn!(
                event_name = "system.data.order_id_collision",
                order_id = id.as_str(),
                "order ids differ only by case; the later entry wins"
            );
        }

        let (lexicon, skipped_intent_tags) = IntentLexicon::from_tagged(intents.into_inner());
        for tag in &skipped_intent_tags {
            warn!(
                event_name = "system.data.intent_tag_skipped",
                intent_tag = tag.as_str(),
                "intent tag cannot be selected by trigger phrases and was skipped"
            );
        }
        report.skipped_intent_tags = skipped_intent_tags;

        let knowledge = KnowledgeBase::from_entries(orders, products, faqs);
        Self { lexicon, knowledge, report }
    }
}

fn merged_order_ids<T>(orders: &OrderedEntries<T>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for id in orders.keys().map(str::to_ascii_uppercase) {
        if !seen.insert(id.clone()) && !merged.contains(&id) {
            merged.push(id);
        }
    }
    merged
}

pub fn load_collection<T>(path: &Path) -> Result<OrderedEntries<T>, DataError>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .map_err(|source| DataError::ReadFile { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| DataError::ParseFile { path: path.to_path_buf(), source })
}
