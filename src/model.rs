// Core structs: Position, Properties, CategoryTags, Offer, StockOffer
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// One price-list line item as delivered by the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub brand: String,
    pub number: String,
    pub custom_number: String,
    pub price_sale: f64,
    /// Stock quantity, only used by the stock-update format.
    pub availability: i64,
    pub dead_line: i32,
    pub goods_group_code: String,
    /// Catalog category used for title generation (`tires`, `disks`, `oils`, ...).
    pub category: String,
    pub description: String,
    pub additional_description: String,
    pub title_description: String,
    /// 0 means "generate the title from the category".
    pub description_source: i32,
    /// 0 for new items, 10/30/50/70/90 for used grades.
    pub condition: i32,
    pub used_images: Vec<String>,
    pub packing: String,
    pub route_id: i64,
    pub code: String,
}

impl Position {
    pub fn is_used(&self) -> bool {
        self.condition != 0
    }

    pub fn is_tires(&self) -> bool {
        matches!(
            self.goods_group_code.as_str(),
            "tires" | "truck_tires" | "moto_tires"
        )
    }

    pub fn is_disks(&self) -> bool {
        self.goods_group_code == "disks"
    }

    pub fn is_oils(&self) -> bool {
        matches!(
            self.goods_group_code.as_str(),
            "oils" | "gear_oils" | "coolant"
        )
    }

    /// Custom number when the price list carries one, otherwise the part number.
    pub fn display_number(&self) -> &str {
        if self.custom_number.is_empty() {
            &self.number
        } else {
            &self.custom_number
        }
    }

    /// Key used by the property store: `BRAND|NUMBER`, upper-cased.
    pub fn property_key(&self) -> String {
        format!("{}|{}", self.brand, self.number).to_uppercase()
    }
}

/// A single enrichment value. The store delivers strings, numbers and lists of strings.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl PropValue {
    /// Converts a raw JSON value; unsupported shapes are dropped with a warning.
    pub fn from_json(name: &str, value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(PropValue::Text(s)),
            Value::Number(n) => n.as_f64().map(PropValue::Number),
            Value::Array(items) => Some(PropValue::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )),
            other => {
                warn!(property = name, value = %other, "Unsupported property type, skipping");
                None
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text value, or the first element of a list.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            PropValue::List(items) => items.first().map(String::as_str),
            PropValue::Number(_) => None,
        }
    }

    /// Text as is, numbers without a fractional part rendered as integers.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            PropValue::Text(s) => Some(s.clone()),
            PropValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            PropValue::Number(n) => Some(n.to_string()),
            PropValue::List(_) => None,
        }
    }
}

/// Enrichment attributes of one brand+number key, in store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(IndexMap<String, PropValue>);

impl Properties {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_text)
    }

    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::first_text)
    }

    pub fn scalar(&self, name: &str) -> Option<String> {
        self.get(name).and_then(PropValue::to_scalar_string)
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.get(name) {
            Some(PropValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropValue) {
        self.0.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut PropValue)> {
        self.0.iter_mut()
    }

    pub fn goods_group(&self) -> Option<&str> {
        self.text("goods_group").filter(|g| !g.is_empty())
    }
}

impl<const N: usize> From<[(&str, PropValue); N]> for Properties {
    fn from(entries: [(&str, PropValue); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(name, value)| {
                    PropValue::from_json(&name, value).map(|v| (name, v))
                })
                .collect(),
        ))
    }
}

/// Marketplace category classification of an offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryTags {
    pub category: String,
    pub goods_type: String,
    pub product_type: String,
    pub spare_part_type: String,
    pub spare_part_type2: String,
    pub technic_spare_part_type: String,
    pub goods_group: String,
}

impl CategoryTags {
    /// True when any of category, goods type, product type or spare part type is set.
    pub fn has_primary(&self) -> bool {
        !(self.category.is_empty()
            && self.goods_type.is_empty()
            && self.product_type.is_empty()
            && self.spare_part_type.is_empty())
    }

    /// No primary field and no secondary spare part type.
    pub fn is_blank(&self) -> bool {
        !self.has_primary() && self.spare_part_type2.is_empty()
    }
}

/// `API` tag: a bare value or a list of options.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    Single(String),
    Options(Vec<String>),
}

/// One advertisement record of the ads document. Empty strings and lists are omitted on output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub address: String,
    pub addresses: Vec<String>,
    pub display_areas: Vec<String>,
    pub contact_phone: String,
    pub manager_name: String,
    pub brand: String,
    pub rim_brand: String,
    pub date_end: String,
    pub listing_fee: String,
    pub ad_status: String,
    pub contact_method: String,
    pub ad_type: String,
    pub condition: String,
    pub images: Vec<String>,
    pub video_url: String,
    pub availability: String,

    pub category: String,
    pub goods_type: String,
    pub product_type: String,
    pub spare_part_type: String,
    pub technic_spare_part_type: String,
    pub body_spare_part_type: String,
    pub engine_spare_part_type: String,
    pub transmission_spare_part_type: String,
    pub trunk_type: String,
    pub accessory_type: String,
    pub device_type: String,
    pub installation_location: String,
    pub vehicle_type: String,

    pub atf: String,
    pub volume: String,
    pub sae: String,
    pub acea: String,
    pub api: Option<SpecValue>,
    pub dot: String,
    pub color: String,
    pub oem_oil: Vec<String>,
    pub astm: Vec<String>,

    pub voltage: String,
    pub capacity: String,
    pub dcl: String,
    pub polarity: String,
    pub technic_length: String,
    pub technic_width: String,
    pub technic_height: String,

    pub set: String,
    pub mounting_type: String,
    pub brush_type: String,
    pub brush_length: Option<u32>,
    pub second_brush_length: Option<u32>,
    pub brush_brand: String,

    pub model: String,
    pub tire_year: String,
    pub quantity: Option<i64>,
    pub tire_type: String,
    pub tire_section_width: String,
    pub tire_aspect_ratio: String,
    pub rim_diameter: String,
    pub wheel_axle: String,
    pub rim_type: String,
    pub rim_bolts: String,
    pub rim_bolts_diameter: String,
    pub rim_offset: String,
    pub rim_width: String,
    pub rim_dia: String,

    pub oem: String,
    pub vendor_code: String,
    pub internet_calls: String,
    pub calls_devices: Vec<String>,
    pub delivery: Option<Vec<String>>,
}

/// One record of the stock-update document.
#[derive(Debug, Clone, PartialEq)]
pub struct StockOffer {
    pub id: String,
    pub stock: i64,
}

/// Why a single position produced no record. Skips are counted, never reported one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    InvalidDimensions,
    FilteredDescription,
    NoPicture,
    PictureFilter,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("property store request failed: {0}")]
    Http(String),
    #[error("property store responded with status {0}")]
    Status(u16),
    #[error("property store returned malformed data: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no feed parameters configured for this price type")]
    MissingFeedConfig,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid description pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("{field} is longer than {limit} characters")]
    FieldTooLong { field: &'static str, limit: usize },
    #[error("reference data error: {0}")]
    Reference(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("xml serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("output queue closed before the producer finished")]
    QueueClosed,
    #[error("pipeline task failed: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_keep_store_order_and_drop_unsupported_values() {
        let raw = r#"{"viscosity":"5W-30","liquid_volume":4.0,"flag":true,"api_spec":["SN",1,"CF"]}"#;
        let props: Properties = serde_json::from_str(raw).unwrap();

        let names: Vec<&String> = props.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["viscosity", "liquid_volume", "api_spec"]);
        assert_eq!(props.list("api_spec").unwrap(), ["SN", "CF"]);
        assert_eq!(props.get("liquid_volume"), Some(&PropValue::Number(4.0)));
    }

    #[test]
    fn scalar_renders_integral_numbers_without_fraction() {
        assert_eq!(PropValue::Number(2.0).to_scalar_string().as_deref(), Some("2"));
        assert_eq!(PropValue::Number(2.5).to_scalar_string().as_deref(), Some("2.5"));
        assert_eq!(PropValue::List(vec![]).to_scalar_string(), None);
    }

    #[test]
    fn position_groups() {
        let pos = Position {
            goods_group_code: "truck_tires".into(),
            ..Position::default()
        };
        assert!(pos.is_tires());
        assert!(!pos.is_disks());
        assert!(!pos.is_oils());
    }

    #[test]
    fn category_tags_primary_fields() {
        let mut tags = CategoryTags::default();
        assert!(tags.is_blank());
        tags.spare_part_type2 = "Сменный элемент".into();
        assert!(!tags.has_primary());
        assert!(!tags.is_blank());
        tags.goods_type = "Жидкости".into();
        assert!(tags.has_primary());
    }
}
