use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Catalog row as it appears in the products file, keyed externally by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(deserialize_with = "price_as_written")]
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
}

impl Product {
    pub fn from_record(id: impl Into<String>, record: ProductRecord) -> Self {
        Self {
            id: ProductId(id.into()),
            name: record.name,
            price: record.price,
            category: record.category,
        }
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }

    /// `<name> ($<price>)`. The price keeps the scale it was loaded with, so
    /// `129.0` prints as `129.0` and `40` as `40`.
    pub fn display_line(&self) -> String {
        format!("{} (${})", self.name, self.price)
    }
}

/// Reads a JSON number through its textual form so `129.0` keeps one
/// decimal place instead of collapsing to `129`.
fn price_as_written<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|error| serde::de::Error::custom(format!("invalid price `{text}`: {error}")))
}
