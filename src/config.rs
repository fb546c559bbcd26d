use crate::model::FeedError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Which free-text field drives the title, the description body and the classification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum DescriptionSource {
    /// Codes 0 and 1: price-list description plus generated parameters.
    #[default]
    Standard,
    /// Code 2: additional description (or description), no parameters.
    Additional,
    /// Code 3: additional description (or description) plus parameters.
    AdditionalWithParams,
    /// Code 4: optional additional description plus parameters.
    ParamsOnly,
    /// Code 5: goods directory; title from the title description.
    Directory,
    /// Code 7: product information cards; title from the title description.
    ProductInfo,
}

impl TryFrom<u8> for DescriptionSource {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 | 1 => Ok(Self::Standard),
            2 => Ok(Self::Additional),
            3 => Ok(Self::AdditionalWithParams),
            4 => Ok(Self::ParamsOnly),
            5 => Ok(Self::Directory),
            7 => Ok(Self::ProductInfo),
            other => Err(format!("unknown priority description source {}", other)),
        }
    }
}

impl DescriptionSource {
    /// Whether the generic parameter list is reduced to the goods group's required properties.
    pub fn filters_required_props(self) -> bool {
        matches!(
            self,
            Self::Standard | Self::AdditionalWithParams | Self::ParamsOnly
        )
    }

    pub fn uses_additional_description(self) -> bool {
        matches!(self, Self::Additional | Self::AdditionalWithParams)
    }

    pub fn uses_title_description(self) -> bool {
        matches!(self, Self::Directory | Self::ProductInfo)
    }
}

/// How the offer identity is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum OfferIdStrategy {
    #[default]
    RouteHash,
    Hash,
    BrandNumber,
    WarehouseCode,
}

impl TryFrom<u8> for OfferIdStrategy {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::RouteHash),
            1 => Ok(Self::Hash),
            2 => Ok(Self::BrandNumber),
            3 => Ok(Self::WarehouseCode),
            other => Err(format!("unknown offer id strategy {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum PictureFilter {
    #[default]
    Off,
    OnlyWithPictures,
    OnlyWithoutPictures,
}

impl TryFrom<u8> for PictureFilter {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Off),
            1 => Ok(Self::OnlyWithPictures),
            2 => Ok(Self::OnlyWithoutPictures),
            other => Err(format!("unknown picture filter {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBand {
    #[serde(default)]
    pub min_price: f64,
    /// 0 means unbounded.
    #[serde(default)]
    pub max_price: f64,
    pub delivery_types: Vec<String>,
}

/// Marketplace account settings of one feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedConfig {
    pub address: String,
    pub additional_addresses: Vec<String>,
    pub display_areas: Vec<String>,
    pub manager_name: String,
    pub contact_phone: String,
    pub contact_method: u8,
    pub date_end: u8,
    pub ad_type: u8,
    pub listing_fee: u8,
    pub ad_status: u8,
    pub condition: u8,
    pub availability: u8,
    pub sales_conditions: String,
    #[serde(rename = "propertiesURL")]
    pub properties_url: String,
    pub exclude_offers_without_picture: bool,
    pub always_generate_image: bool,
    pub disable_alternative_image: bool,
    pub alternative_image_proxy: String,
    pub alternative_image_request_method: String,
    /// 0 takes the quantity from the position packing, otherwise `tires_quantity`.
    pub tires_quantity_type: u8,
    pub tires_quantity: i64,
    pub tire_year: String,
    pub update_stock_format: bool,
    #[serde(rename = "avitoOfferId")]
    pub offer_id_strategy: OfferIdStrategy,
    #[serde(rename = "videoURL")]
    pub video_url: String,
    pub internet_calls: bool,
    pub calls_devices: Vec<String>,
    pub remove_statement_type_from_descr: bool,
    #[serde(rename = "DeliveryFromPrices")]
    pub delivery_from_prices: Vec<DeliveryBand>,
    pub hide_price_tag: bool,
    pub update_photo: bool,
    pub update_photo_count: i64,
    pub filter_offers_picture: PictureFilter,
}

impl FeedConfig {
    /// Rejects codes outside the ranges the marketplace accepts.
    pub fn validate(&self) -> Result<(), FeedError> {
        let checks: [(&str, u8, std::ops::RangeInclusive<u8>); 7] = [
            ("contactMethod", self.contact_method, 0..=2),
            ("adType", self.ad_type, 0..=1),
            ("adStatus", self.ad_status, 0..=17),
            ("condition", self.condition, 0..=1),
            ("dateEnd", self.date_end, 0..=10),
            ("availability", self.availability, 0..=2),
            ("tiresQuantityType", self.tires_quantity_type, 0..=1),
        ];
        for (name, value, range) in checks {
            if !range.contains(&value) {
                return Err(FeedError::Config(format!(
                    "{} code {} is out of range",
                    name, value
                )));
            }
        }
        if self.listing_fee != 0 && !(1..=3).contains(&self.listing_fee) {
            return Err(FeedError::Config(format!(
                "listingFee code {} is out of range",
                self.listing_fee
            )));
        }
        Ok(())
    }
}

/// Localized fragments used in titles and descriptions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Localization {
    pub wearout_pre_owned: String,
    pub list_th_bu_statement: String,
    pub statement_type_new: String,
    pub statement_type_perfect: String,
    pub statement_type_good: String,
    pub statement_type_normal: String,
    pub statement_type_broken: String,
    pub statement_type_repair_kit: String,
}

/// Parameter display names and value translations of one goods group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoodsGroupPack {
    pub pns: HashMap<String, String>,
    #[serde(alias = "translatedprops")]
    pub translated_props: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineParams {
    pub priority_description_source: DescriptionSource,
    pub localization: Localization,
    pub image_inc: i64,
    pub included_descriptions: Vec<String>,
    pub excluded_descriptions: Vec<String>,
    pub included_description_patterns: Vec<String>,
    pub excluded_description_patterns: Vec<String>,
    pub goods_group_pack: HashMap<String, GoodsGroupPack>,
}

fn default_batch_size() -> usize {
    1000
}

fn default_queue_capacity() -> usize {
    2
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub feed: Option<FeedConfig>,
    #[serde(default)]
    pub params: PipelineParams,
    pub reference_path: PathBuf,
    pub positions_path: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, FeedError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    if let Some(feed) = &config.feed {
        feed.validate()?;
    }
    if config.batch_size == 0 || config.queue_capacity == 0 {
        return Err(FeedError::Config(
            "batchSize and queueCapacity must be positive".into(),
        ));
    }
    Ok(config)
}
