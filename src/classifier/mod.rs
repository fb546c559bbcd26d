// Classification cascade: brand -> goods group -> description keyword -> default.

pub mod matcher;

use crate::config::DescriptionSource;
use crate::model::{CategoryTags, Offer, Position, Properties};
use crate::reference::{KeywordTags, ReferenceData};
use matcher::{brand_text, keyword_matches, keyword_text, WordRule};

pub const TRUCKS_PRODUCT_TYPE: &str = "Для грузовиков и спецтехники";
const TRANSMISSION_OILS: &str = "Трансмиссионные масла";
const HYDRAULIC_FLUIDS: &str = "Гидравлические жидкости";
const POWER_STEERING_MARKER: &str = "ГУР";
const ACCESSORIES: &str = "Аксессуары";
const ANTI_THEFT_DEVICES: &str = "Противоугонные устройства";
const DEFLECTORS: &str = "Дефлекторы";
const WINDOWS: &str = "Окна";

const DEFAULT_TRUCK_SPARE_PART_TYPE: &str = "Трансмиссия";
const DEFAULT_TRUCK_TECHNIC_SPARE_PART_TYPE: &str = "Детали КПП";

/// Goods groups whose category never comes from the brand table.
const BRAND_STAGE_EXEMPT_GROUPS: [&str; 13] = [
    "22", "105", "26", "33", "9", "81", "10", "76", "75", "109", "106", "214", "110",
];

const DEFAULT_GOODS_GROUP_ID: &str = "1";

/// Stage of the cascade that produced the tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    Brand,
    GoodsGroup,
    Description,
    #[default]
    Default,
}

/// Category fields of one offer after the cascade and its overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub stage: Stage,
    pub category: String,
    pub goods_type: String,
    pub product_type: String,
    pub spare_part_type: String,
    pub technic_spare_part_type: String,
    pub accessory_type: String,
    pub device_type: String,
    pub installation_location: String,
    pub body_spare_part_type: String,
    pub engine_spare_part_type: String,
    pub transmission_spare_part_type: String,
    pub trunk_type: String,
    /// Goods group found by the description stage; replaces the enrichment goods group.
    pub goods_group_override: Option<String>,
}

impl Classification {
    pub fn apply_to(&self, offer: &mut Offer) {
        offer.category = self.category.clone();
        offer.goods_type = self.goods_type.clone();
        offer.product_type = self.product_type.clone();
        offer.spare_part_type = self.spare_part_type.clone();
        offer.technic_spare_part_type = self.technic_spare_part_type.clone();
        offer.accessory_type = self.accessory_type.clone();
        offer.device_type = self.device_type.clone();
        offer.installation_location = self.installation_location.clone();
        offer.body_spare_part_type = self.body_spare_part_type.clone();
        offer.engine_spare_part_type = self.engine_spare_part_type.clone();
        offer.transmission_spare_part_type = self.transmission_spare_part_type.clone();
        offer.trunk_type = self.trunk_type.clone();
    }
}

pub struct Classifier<'a> {
    reference: &'a ReferenceData,
    source: DescriptionSource,
}

impl<'a> Classifier<'a> {
    pub fn new(reference: &'a ReferenceData, source: DescriptionSource) -> Self {
        Self { reference, source }
    }

    /// Assigns marketplace category tags. `brand` is the brand written to the offer
    /// (empty for disks, whose brand goes to the rim brand).
    pub fn classify(&self, pos: &Position, brand: &str, props: &Properties) -> Classification {
        let goods_group_id = self
            .reference
            .goods_group_id(props.goods_group(), &pos.goods_group_code);

        let mut result = Classification::default();
        let mut tags = CategoryTags::default();

        let brand_exempt = goods_group_id
            .as_deref()
            .is_some_and(|id| BRAND_STAGE_EXEMPT_GROUPS.contains(&id));
        if !brand_exempt {
            if let Some(found) = self.by_brand(pos, brand) {
                take_primary(&mut tags, found);
                result.stage = Stage::Brand;
            }
        }

        if !tags.has_primary() {
            if let Some(found) = goods_group_id.as_deref().and_then(|id| self.reference.category(id)) {
                take_primary(&mut tags, found);
                tags.spare_part_type2 = found.spare_part_type2.clone();
                result.stage = Stage::GoodsGroup;
            }
        }

        if tags.is_blank() {
            if let Some(found) = self.by_description(pos) {
                if !found.goods_group.is_empty() {
                    result.goods_group_override = Some(found.goods_group.clone());
                }
                tags = found;
                result.stage = Stage::Description;
            }
        }

        if tags.is_blank() {
            if let Some(found) = self.reference.category(DEFAULT_GOODS_GROUP_ID) {
                take_primary(&mut tags, found);
                tags.spare_part_type2 = found.spare_part_type2.clone();
            }
            result.stage = Stage::Default;
        }

        result.category = tags.category;
        result.goods_type = tags.goods_type;
        result.product_type = tags.product_type;
        result.spare_part_type = tags.spare_part_type;
        self.apply_overlays(&mut result, pos, props, &tags.spare_part_type2);
        result
    }

    /// Scans the brand table in order. A trucks entry wins at once, otherwise the first match.
    fn by_brand(&self, pos: &Position, brand: &str) -> Option<&'a CategoryTags> {
        let text = brand_text(pos, self.source);
        let mut first: Option<&'a CategoryTags> = None;

        for entry in &self.reference.brand_categories {
            let brand_equal = !brand.is_empty() && brand.to_uppercase() == entry.key.to_uppercase();
            if !brand_equal && !keyword_matches(&text, &entry.key, WordRule::Whole) {
                continue;
            }
            if entry.tags.product_type == TRUCKS_PRODUCT_TYPE {
                return Some(&entry.tags);
            }
            first.get_or_insert(&entry.tags);
        }

        first
    }

    /// First description keyword found in the text, resolving goods-group-only entries.
    fn by_description(&self, pos: &Position) -> Option<CategoryTags> {
        let text = keyword_text(pos, self.source);
        let entry = first_match(&self.reference.descr_categories, &text, WordRule::Prefix)?;

        let mut tags = entry.tags.clone();
        if tags.is_blank() && !entry.tags.goods_group.is_empty() {
            let group = entry.tags.goods_group.as_str();
            tags = self
                .reference
                .goods_group_id(Some(group), group)
                .and_then(|id| self.reference.category(&id).cloned())
                .unwrap_or_default();
            tags.goods_group = group.to_string();
        }
        Some(tags)
    }

    fn by_truck_description(&self, pos: &Position) -> Option<&'a CategoryTags> {
        let text = keyword_text(pos, self.source);
        first_match(&self.reference.truck_descr_categories, &text, WordRule::Substring)
            .map(|entry| &entry.tags)
    }

    fn apply_overlays(
        &self,
        result: &mut Classification,
        pos: &Position,
        props: &Properties,
        spare_part_type2: &str,
    ) {
        if result.product_type == TRUCKS_PRODUCT_TYPE {
            let (spare, technic) = self
                .by_truck_description(pos)
                .map(|t| (t.spare_part_type.clone(), t.technic_spare_part_type.clone()))
                .unwrap_or_default();
            if spare.is_empty() && technic.is_empty() {
                result.spare_part_type = DEFAULT_TRUCK_SPARE_PART_TYPE.to_string();
                result.technic_spare_part_type = DEFAULT_TRUCK_TECHNIC_SPARE_PART_TYPE.to_string();
            } else {
                result.spare_part_type = spare;
                result.technic_spare_part_type = technic;
            }
        }

        if result.product_type == TRANSMISSION_OILS
            && props.first_text("applicability") == Some(POWER_STEERING_MARKER)
        {
            result.product_type = HYDRAULIC_FLUIDS.to_string();
        }

        if result.goods_type == ACCESSORIES {
            result.accessory_type = std::mem::take(&mut result.spare_part_type);
        }

        if result.goods_type == ANTI_THEFT_DEVICES {
            result.device_type = std::mem::take(&mut result.product_type);
        }

        if result.accessory_type == DEFLECTORS {
            result.installation_location = WINDOWS.to_string();
        }

        match result.spare_part_type.as_str() {
            "Кузов" => result.body_spare_part_type = spare_part_type2.to_string(),
            "Двигатель" => result.engine_spare_part_type = spare_part_type2.to_string(),
            "Трансмиссия и привод" => {
                result.transmission_spare_part_type = spare_part_type2.to_string()
            }
            _ => {}
        }

        if result.goods_type == "Багажники и фаркопы" {
            result.trunk_type = spare_part_type2.to_string();
        }
    }
}

fn take_primary(tags: &mut CategoryTags, found: &CategoryTags) {
    tags.category = found.category.clone();
    tags.goods_type = found.goods_type.clone();
    tags.product_type = found.product_type.clone();
    tags.spare_part_type = found.spare_part_type.clone();
}

fn first_match<'t>(table: &'t [KeywordTags], text: &str, rule: WordRule) -> Option<&'t KeywordTags> {
    table
        .iter()
        .find(|entry| keyword_matches(text, &entry.key, rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropValue;
    use std::collections::HashMap;

    fn tags(category: &str, goods_type: &str, product_type: &str, spare: &str) -> CategoryTags {
        CategoryTags {
            category: category.into(),
            goods_type: goods_type.into(),
            product_type: product_type.into(),
            spare_part_type: spare.into(),
            ..CategoryTags::default()
        }
    }

    fn keyword(key: &str, tags: CategoryTags) -> KeywordTags {
        KeywordTags { key: key.into(), tags }
    }

    fn reference() -> ReferenceData {
        let mut filters = tags("Запчасти", "Для автомобилей", "", "");
        filters.spare_part_type2 = "Сменный элемент".into();
        let engine_filters = CategoryTags {
            spare_part_type2: "Фильтры".into(),
            ..tags("Запчасти", "Для автомобилей", "Масляный фильтр", "Двигатель")
        };

        ReferenceData {
            categories: HashMap::from([
                ("1".to_string(), tags("Запчасти", "Прочее", "", "")),
                ("17".to_string(), tags("Масла", "Авто масла", "Моторное масло", "")),
                ("22".to_string(), tags("Шины", "Шины", "Легковые", "")),
                ("30".to_string(), engine_filters),
            ]),
            brand_categories: vec![
                keyword("TOYOTA", tags("Легковые", "Двигатель", "Масла", "Фильтры")),
                keyword("KAMAZ", tags("Грузовики", "Двигатель", TRUCKS_PRODUCT_TYPE, "Трансмиссия")),
            ],
            descr_categories: vec![
                keyword("фильтр масляный", CategoryTags {
                    goods_group: "filters".into(),
                    ..CategoryTags::default()
                }),
                keyword("дефлектор", tags("Запчасти", ACCESSORIES, "", DEFLECTORS)),
                keyword("сигнализация", tags("Запчасти", ANTI_THEFT_DEVICES, "Сигнализации", "")),
                keyword("масло", tags("Масла", "Авто масла", "Моторное масло", "")),
            ],
            truck_descr_categories: vec![keyword("головка", CategoryTags {
                spare_part_type: "Двигатель".into(),
                technic_spare_part_type: "Головка блока".into(),
                ..CategoryTags::default()
            })],
            goods_group_ids: HashMap::from([
                ("oils".to_string(), "17".to_string()),
                ("tires".to_string(), "22".to_string()),
                ("filters".to_string(), "30".to_string()),
            ]),
            ..ReferenceData::default()
        }
    }

    fn position(description: &str) -> Position {
        Position {
            description: description.into(),
            ..Position::default()
        }
    }

    #[test]
    fn brand_match_short_circuits_description_table() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let result = classifier.classify(&position("Оригинальное масло TOYOTA"), "", &Properties::new());

        assert_eq!(result.stage, Stage::Brand);
        assert_eq!(result.category, "Легковые");
        assert_eq!(result.product_type, "Масла");
        assert_eq!(result.spare_part_type, "Фильтры");
        assert!(result.goods_group_override.is_none());
    }

    #[test]
    fn brand_equality_matches_without_text() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let result = classifier.classify(&position("детали"), "kamaz", &Properties::new());

        assert_eq!(result.stage, Stage::Brand);
        assert_eq!(result.product_type, TRUCKS_PRODUCT_TYPE);
        assert_eq!(result.spare_part_type, DEFAULT_TRUCK_SPARE_PART_TYPE);
        assert_eq!(result.technic_spare_part_type, DEFAULT_TRUCK_TECHNIC_SPARE_PART_TYPE);
    }

    #[test]
    fn truck_entry_wins_over_earlier_brand_match() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let result = classifier.classify(&position("TOYOTA KAMAZ головка"), "", &Properties::new());

        assert_eq!(result.product_type, TRUCKS_PRODUCT_TYPE);
        assert_eq!(result.spare_part_type, "Двигатель");
        assert_eq!(result.technic_spare_part_type, "Головка блока");
    }

    #[test]
    fn brand_stage_is_skipped_for_exempt_goods_groups() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let pos = Position {
            goods_group_code: "tires".into(),
            ..position("Шина TOYOTA")
        };
        let result = classifier.classify(&pos, "TOYOTA", &Properties::new());

        assert_eq!(result.stage, Stage::GoodsGroup);
        assert_eq!(result.category, "Шины");
    }

    #[test]
    fn goods_group_from_properties() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let props = Properties::from([("goods_group", PropValue::Text("oils".into()))]);
        let result = classifier.classify(&position("5W-30"), "MOBIL", &props);

        assert_eq!(result.stage, Stage::GoodsGroup);
        assert_eq!(result.product_type, "Моторное масло");
    }

    #[test]
    fn description_entry_resolves_goods_group_second_hop() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let result = classifier.classify(&position("Фильтр масляный MANN"), "MANN", &Properties::new());

        assert_eq!(result.stage, Stage::Description);
        assert_eq!(result.product_type, "Масляный фильтр");
        assert_eq!(result.engine_spare_part_type, "Фильтры");
        assert_eq!(result.goods_group_override.as_deref(), Some("filters"));
    }

    #[test]
    fn description_stage_uses_word_prefix() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);

        let result = classifier.classify(&position("Дефлекторы окон"), "", &Properties::new());
        assert_eq!(result.goods_type, ACCESSORIES);
        assert_eq!(result.accessory_type, DEFLECTORS);
        assert_eq!(result.spare_part_type, "");
        assert_eq!(result.installation_location, WINDOWS);

        let result = classifier.classify(&position("Автосигнализация StarLine"), "", &Properties::new());
        assert_eq!(result.stage, Stage::Default);
        assert_eq!(result.goods_type, "Прочее");
    }

    #[test]
    fn anti_theft_moves_product_type() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let result = classifier.classify(&position("Сигнализация StarLine"), "", &Properties::new());

        assert_eq!(result.device_type, "Сигнализации");
        assert_eq!(result.product_type, "");
    }

    #[test]
    fn transmission_oil_for_power_steering_becomes_hydraulic_fluid() {
        let mut reference = reference();
        reference
            .categories
            .insert("50".into(), tags("Масла", "Авто масла", TRANSMISSION_OILS, ""));
        reference.goods_group_ids.insert("gear_oils".into(), "50".into());
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);

        let props = Properties::from([
            ("goods_group", PropValue::Text("gear_oils".into())),
            ("applicability", PropValue::List(vec!["ГУР".into(), "МКПП".into()])),
        ]);
        let result = classifier.classify(&position("ATF"), "", &props);
        assert_eq!(result.product_type, HYDRAULIC_FLUIDS);
    }

    #[test]
    fn additional_description_feeds_brand_stage() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Additional);
        let pos = Position {
            additional_description: "TOYOTA extra info".into(),
            ..position("")
        };
        let result = classifier.classify(&pos, "", &Properties::new());
        assert_eq!(result.category, "Легковые");
    }

    #[test]
    fn default_goods_group_when_nothing_matches() {
        let reference = reference();
        let classifier = Classifier::new(&reference, DescriptionSource::Standard);
        let result = classifier.classify(&position("что-то"), "NONAME", &Properties::new());

        assert_eq!(result.stage, Stage::Default);
        assert_eq!(result.category, "Запчасти");
        assert_eq!(result.goods_type, "Прочее");
    }
}
