//! Read-only access to the reference data behind rule resolution.
//!
//! Orders are looked up by id, products are listed in catalog order and FAQ
//! answers are looked up by topic. Everything is fixed at construction;
//! picking up changed files requires building a new instance.

pub mod loader;
pub mod ordered;

use std::collections::HashMap;

use crate::domain::order::{Order, OrderRecord};
use crate::domain::product::{Product, ProductRecord};

pub use loader::{CollectionKind, CollectionStatus, LoadReport, ReferenceData};
pub use ordered::OrderedEntries;

pub const RETURN_POLICY_TOPIC: &str = "return_policy";

#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    orders: HashMap<String, Order>,
    products: Vec<Product>,
    faqs: Vec<(String, String)>,
}

impl KnowledgeBase {
    pub fn new(orders: Vec<Order>, products: Vec<Product>, faqs: Vec<(String, String)>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.id.as_str().to_string(), order))
            .collect();
        Self { orders, products, faqs }
    }

    pub fn from_entries(
        orders: OrderedEntries<OrderRecord>,
        products: OrderedEntries<ProductRecord>,
        faqs: OrderedEntries<String>,
    ) -> Self {
        let orders = orders
            .into_inner()
            .into_iter()
            .map(|(id, record)| Order::from_record(id, record))
            .collect();
        let products = products
            .into_inner()
            .into_iter()
            .map(|(id, record)| Product::from_record(id, record))
            .collect();
        Self::new(orders, products, faqs.into_inner())
    }

    /// Exact, case-sensitive lookup. Loaded ids are upper-case, so callers
    /// upper-case the query first.
    pub fn lookup_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Products in catalog order, optionally restricted to one category.
    pub fn list_products<'a>(
        &'a self,
        category: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products.iter().filter(move |product| match category {
            Some(category) => product.in_category(category),
            None => true,
        })
    }

    pub fn lookup_faq(&self, topic: &str) -> Option<&str> {
        self.faqs.iter().find(|(key, _)| key == topic).map(|(_, answer)| answer.as_str())
    }

    /// Distinct product categories in first-seen catalog order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for category in self.products.iter().filter_map(|product| product.category.as_ref()) {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn faq_count(&self) -> usize {
        self.faqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.products.is_empty() && self.faqs.is_empty()
    }
}
