// Reference tables loaded once per task and shared read-only.
use crate::model::{CategoryTags, FeedError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Keyword (brand or description fragment) with the tags it implies.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordTags {
    pub key: String,
    #[serde(flatten)]
    pub tags: CategoryTags,
}

/// Tire model name normalization record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TireModel {
    pub avito_name: String,
    /// Upper-cased name with everything but letters and digits removed.
    pub avito_name_fix: String,
    pub abcp_name: String,
    pub manual: bool,
}

#[derive(Clone, Copy)]
enum Table {
    Categories,
    Brand,
    Description,
    TruckDescription,
}

/// Lookup tables of the marketplace classification.
///
/// Keyword tables are ordered lists: the first matching entry wins, so the
/// file order is part of the contract.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceData {
    /// Goods-group id -> tags.
    pub categories: HashMap<String, CategoryTags>,
    pub brand_categories: Vec<KeywordTags>,
    pub descr_categories: Vec<KeywordTags>,
    pub truck_descr_categories: Vec<KeywordTags>,
    /// Goods-group code (`oils`, `tires`, ...) -> goods-group id.
    pub goods_group_ids: HashMap<String, String>,
    pub oem_spec: HashMap<String, String>,
    pub atf_spec: HashMap<String, String>,
    pub tire_models: Vec<TireModel>,
}

impl ReferenceData {
    pub fn from_json(raw: &str) -> Result<Self, FeedError> {
        let data: ReferenceData = serde_json::from_str(raw)
            .map_err(|e| FeedError::Reference(e.to_string()))?;
        Ok(data.normalized())
    }

    /// Replaces `-` placeholder cells with empty values.
    pub fn normalized(mut self) -> Self {
        for tags in self.categories.values_mut() {
            strip_placeholders(tags, Table::Categories);
        }
        for entry in &mut self.brand_categories {
            strip_placeholders(&mut entry.tags, Table::Brand);
        }
        for entry in &mut self.descr_categories {
            strip_placeholders(&mut entry.tags, Table::Description);
        }
        for entry in &mut self.truck_descr_categories {
            strip_placeholders(&mut entry.tags, Table::TruckDescription);
        }
        self
    }

    /// Resolves a goods-group id, preferring the enrichment goods group over the position's code.
    pub fn goods_group_id(&self, props_group: Option<&str>, position_group: &str) -> Option<String> {
        [props_group, Some(position_group)]
            .into_iter()
            .flatten()
            .filter(|group| !group.is_empty())
            .find_map(|group| {
                self.goods_group_ids.get(group).cloned().or_else(|| {
                    self.categories
                        .contains_key(group)
                        .then(|| group.to_string())
                })
            })
    }

    pub fn category(&self, goods_group_id: &str) -> Option<&CategoryTags> {
        self.categories.get(goods_group_id)
    }
}

fn is_placeholder(value: &str) -> bool {
    value.trim() == "-"
}

fn clear_placeholder(value: &mut String) {
    if is_placeholder(value) {
        value.clear();
    }
}

fn strip_placeholders(tags: &mut CategoryTags, table: Table) {
    clear_placeholder(&mut tags.spare_part_type);
    match table {
        Table::TruckDescription => clear_placeholder(&mut tags.technic_spare_part_type),
        Table::Brand => {
            clear_placeholder(&mut tags.product_type);
            clear_placeholder(&mut tags.goods_type);
            clear_placeholder(&mut tags.category);
        }
        Table::Categories | Table::Description => {
            clear_placeholder(&mut tags.product_type);
            clear_placeholder(&mut tags.goods_type);
            clear_placeholder(&mut tags.category);
            clear_placeholder(&mut tags.spare_part_type2);
        }
    }
}

pub fn load_reference(path: impl AsRef<Path>) -> Result<ReferenceData, FeedError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let data = ReferenceData::from_json(&raw)?;
    info!(
        "Loaded reference data from {}: {} goods groups, {} brand keywords, {} description keywords",
        path.display(),
        data.categories.len(),
        data.brand_categories.len(),
        data.descr_categories.len()
    );
    Ok(data)
}
