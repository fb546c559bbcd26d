pub mod http;

use crate::model::{Properties, StoreError};
use std::collections::HashMap;

pub use http::HttpPropertyStore;

#[cfg(test)]
use mockall::automock;

/// Enrichment attributes keyed by upper-cased `BRAND|NUMBER`.
pub type PropertyIndex = HashMap<String, Properties>;

/// Source of per-SKU enrichment attributes, loaded once per task.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PropertyStore: Send + Sync {
    async fn load(&self, url: &str) -> Result<PropertyIndex, StoreError>;
}

/// Upper-cases the keys so lookups by [`Position::property_key`](crate::model::Position::property_key) hit.
pub fn normalize_keys(index: PropertyIndex) -> PropertyIndex {
    index
        .into_iter()
        .map(|(key, props)| (key.to_uppercase(), props))
        .collect()
}

/// Store backed by an index already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPropertyStore {
    index: PropertyIndex,
}

impl StaticPropertyStore {
    pub fn new(index: PropertyIndex) -> Self {
        Self {
            index: normalize_keys(index),
        }
    }
}

#[async_trait::async_trait]
impl PropertyStore for StaticPropertyStore {
    async fn load(&self, _url: &str) -> Result<PropertyIndex, StoreError> {
        Ok(self.index.clone())
    }
}
