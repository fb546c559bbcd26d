use crate::config::{FeedConfig, PipelineParams};
use crate::description::DescriptionFilter;
use crate::images::{ImageResolver, ImageSettings};
use crate::listing::ListingTemplate;
use crate::mapper::wheels::resolve_tire_year;
use crate::mapper::TireSettings;
use crate::model::FeedError;
use crate::reference::ReferenceData;
use crate::store::{PropertyIndex, PropertyStore};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

/// Everything a task needs after Init. Read-only while batches are produced.
pub struct TaskContext {
    pub reference: Arc<ReferenceData>,
    pub properties: PropertyIndex,
    pub params: PipelineParams,
    pub template: ListingTemplate,
    pub images: ImageResolver,
    pub filter: DescriptionFilter,
    pub tires: TireSettings,
    pub sales_conditions: String,
    pub remove_statement_type: bool,
    pub update_stock_format: bool,
}

impl TaskContext {
    pub async fn init(
        feed: Option<&FeedConfig>,
        params: PipelineParams,
        reference: Arc<ReferenceData>,
        store: &dyn PropertyStore,
    ) -> Result<Self, FeedError> {
        Self::init_at(feed, params, reference, store, Local::now().date_naive()).await
    }

    /// Init with a fixed "today", used for date-dependent fields.
    pub async fn init_at(
        feed: Option<&FeedConfig>,
        params: PipelineParams,
        reference: Arc<ReferenceData>,
        store: &dyn PropertyStore,
        today: NaiveDate,
    ) -> Result<Self, FeedError> {
        let feed = feed.ok_or(FeedError::MissingFeedConfig)?;
        let template = ListingTemplate::new(feed, today, &params.localization.wearout_pre_owned)?;
        let filter = DescriptionFilter::new(&params)?;

        let properties = store.load(&feed.properties_url).await?;
        info!("Task initialized with {} property records", properties.len());

        Ok(Self {
            reference,
            properties,
            template,
            filter,
            images: ImageResolver::new(ImageSettings::new(feed, params.image_inc)),
            tires: TireSettings {
                year: resolve_tire_year(&feed.tire_year, today),
                quantity_type: feed.tires_quantity_type,
                quantity: feed.tires_quantity,
            },
            sales_conditions: feed.sales_conditions.clone(),
            remove_statement_type: feed.remove_statement_type_from_descr,
            update_stock_format: feed.update_stock_format,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoreError;
    use crate::store::MockPropertyStore;

    fn reference() -> Arc<ReferenceData> {
        Arc::new(ReferenceData::default())
    }

    #[tokio::test]
    async fn missing_feed_config_is_fatal() {
        let mut store = MockPropertyStore::new();
        store.expect_load().never();
        let result = TaskContext::init(None, PipelineParams::default(), reference(), &store).await;
        assert!(matches!(result, Err(FeedError::MissingFeedConfig)));
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let mut store = MockPropertyStore::new();
        store
            .expect_load()
            .withf(|url| url == "https://props")
            .times(1)
            .returning(|_| Err(StoreError::Status(503)));
        let feed = FeedConfig {
            properties_url: "https://props".into(),
            ..FeedConfig::default()
        };
        let result = TaskContext::init(Some(&feed), PipelineParams::default(), reference(), &store).await;
        assert!(matches!(result, Err(FeedError::Store(StoreError::Status(503)))));
    }

    #[tokio::test]
    async fn long_address_fails_before_loading_properties() {
        let mut store = MockPropertyStore::new();
        store.expect_load().never();
        let feed = FeedConfig {
            address: "а".repeat(257),
            ..FeedConfig::default()
        };
        let result = TaskContext::init(Some(&feed), PipelineParams::default(), reference(), &store).await;
        assert!(matches!(result, Err(FeedError::FieldTooLong { field: "address", .. })));
    }

    #[tokio::test]
    async fn invalid_pattern_is_fatal() {
        let mut store = MockPropertyStore::new();
        store.expect_load().never();
        let params = PipelineParams {
            included_description_patterns: vec!["[".into()],
            ..PipelineParams::default()
        };
        let result = TaskContext::init(Some(&FeedConfig::default()), params, reference(), &store).await;
        assert!(matches!(result, Err(FeedError::InvalidPattern { .. })));
    }

    #[tokio::test]
    async fn tire_year_is_resolved_once() {
        let mut store = MockPropertyStore::new();
        store.expect_load().returning(|_| Ok(PropertyIndex::new()));
        let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let ctx = TaskContext::init_at(
            Some(&FeedConfig::default()),
            PipelineParams::default(),
            reference(),
            &store,
            today,
        )
        .await
        .unwrap();
        assert_eq!(ctx.tires.year, "2025");
        assert!(ctx.properties.is_empty());
    }
}
