use crate::model::StoreError;
use crate::store::{normalize_keys, PropertyIndex, PropertyStore};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// Fetches the property index as a JSON object `{"BRAND|NUMBER": {name: value}}`.
pub struct HttpPropertyStore {
    client: Client,
}

impl HttpPropertyStore {
    pub fn new(timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PropertyStore for HttpPropertyStore {
    async fn load(&self, url: &str) -> Result<PropertyIndex, StoreError> {
        info!("Fetching properties from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let index: PropertyIndex = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        info!("Loaded properties for {} items", index.len());
        Ok(normalize_keys(index))
    }
}
