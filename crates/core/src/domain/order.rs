use serde::{Deserialize, Serialize};

pub const DEFAULT_RETURN_DAYS: u32 = 7;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Order row as it appears in the orders file, keyed externally by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub status: String,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub return_days: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub delivery_date: Option<String>,
    pub return_days: Option<u32>,
}

impl Order {
    /// Ids are stored upper-case, matching how they are extracted from text.
    pub fn from_record(id: impl Into<String>, record: OrderRecord) -> Self {
        Self {
            id: OrderId(id.into().to_ascii_uppercase()),
            status: record.status,
            delivery_date: record.delivery_date,
            return_days: record.return_days,
        }
    }

    pub fn return_window_days(&self) -> u32 {
        self.return_days.unwrap_or(DEFAULT_RETURN_DAYS)
    }
}
