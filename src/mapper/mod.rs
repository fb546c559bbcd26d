// Generic parameter list and dispatch to the per-family attribute mappers.

pub mod batteries;
pub mod fluids;
pub mod wheels;
pub mod wipers;

use crate::config::DescriptionSource;
use crate::model::{Offer, Position, PropValue, Properties, SkipReason};
use crate::reference::ReferenceData;
use crate::utils::{replace_separator_to_comma, title_case};
use std::collections::HashMap;

/// One "name: value" line of the generated product details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub content: String,
}

impl Param {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Properties kept in the parameter list of a goods group when the policy asks for filtering.
const REQUIRED_PROPS: &[(&str, &[&str])] = &[
    ("bicycles", &["age", "type"]),
    ("gear_oils", &["atf_spec", "viscosity", "liquid_volume", "api_spec"]),
    ("compressor_oils", &["liquid_volume"]),
    ("oils", &["viscosity", "liquid_volume", "acea_spec", "api_spec"]),
    ("brake_fluids", &["dot_spec", "liquid_volume"]),
    ("coolant", &["coolant_color", "liquid_volume"]),
    ("batteries", &["voltage", "capacity", "cca", "polarity", "length", "width", "height"]),
    ("wheel_covers", &["diameter"]),
    ("moto_tires", &["axle", "diameter", "disk_type", "holes", "pcd", "et", "width", "height"]),
    ("truck_tires", &["axle", "season", "diameter", "disk_type", "holes", "pcd", "et", "width", "height"]),
    ("tires", &["axle", "season", "diameter", "disk_type", "holes", "pcd", "et", "width", "height"]),
    ("disks", &["axle", "season", "diameter", "disk_type", "holes", "pcd", "et", "width", "hub_diameter"]),
    ("wipers", &["pack_count", "connector", "construction", "length1", "length2"]),
];

pub fn required_props(goods_group: &str) -> Option<&'static [&'static str]> {
    REQUIRED_PROPS
        .iter()
        .find(|(group, _)| *group == goods_group)
        .map(|(_, props)| *props)
}

/// Tire settings resolved once per task.
#[derive(Debug, Clone, Default)]
pub struct TireSettings {
    /// Year written for used tires.
    pub year: String,
    /// 0 takes the quantity from the packing, otherwise `quantity` is used.
    pub quantity_type: u8,
    pub quantity: i64,
}

/// Shared, read-only inputs of the family mappers.
pub struct MapperEnv<'a> {
    pub reference: &'a ReferenceData,
    pub tires: &'a TireSettings,
}

/// True when the position's code or the enrichment goods group names `group`.
pub fn in_group(pos: &Position, props: &Properties, group: &str) -> bool {
    pos.goods_group_code == group || props.goods_group() == Some(group)
}

/// Copy of `raw` with text values and list elements replaced by their non-empty translations.
pub fn translate(raw: &Properties, translations: Option<&HashMap<String, String>>) -> Properties {
    let mut props = raw.clone();
    let Some(translations) = translations.filter(|t| !t.is_empty()) else {
        return props;
    };

    let lookup = |value: &str| {
        translations
            .get(value)
            .filter(|translated| !translated.is_empty())
            .cloned()
    };

    for (_, value) in props.iter_mut() {
        match value {
            PropValue::Text(text) => {
                if let Some(translated) = lookup(text) {
                    *text = translated;
                }
            }
            PropValue::List(items) => {
                for item in items.iter_mut() {
                    if let Some(translated) = lookup(item) {
                        *item = translated;
                    }
                }
            }
            PropValue::Number(_) => {}
        }
    }
    props
}

/// Generic parameter list rendered into the description.
///
/// `pns` maps property names to display names; properties without a display
/// name never appear. Bag order is kept.
pub fn build_params(
    props: &Properties,
    pns: &HashMap<String, String>,
    source: DescriptionSource,
) -> Vec<Param> {
    let group = props.goods_group().unwrap_or_default();
    let required = required_props(group)
        .filter(|list| !list.is_empty() && source.filters_required_props());

    let mut out = Vec::new();
    for (name, value) in props.iter() {
        let Some(display_name) = pns.get(name) else {
            continue;
        };
        if required.is_some_and(|list| !list.contains(&name.as_str())) {
            continue;
        }

        let content = match value {
            PropValue::List(items) if group == "wipers" && name == "connector" => items
                .first()
                .map(|first| render_text(name, first))
                .unwrap_or_default(),
            PropValue::List(items) => items.join("/"),
            PropValue::Number(n) => format!("{:.2}", n),
            PropValue::Text(text) => render_text(name, text),
        };

        if !content.is_empty() {
            out.push(Param::new(display_name.clone(), content));
        }
    }
    out
}

fn render_text(name: &str, value: &str) -> String {
    match name {
        "liquid_volume" => replace_separator_to_comma(value),
        "connector" => wipers::mounting_type(value).unwrap_or_default().to_string(),
        "construction" => title_case(value),
        _ => value.to_string(),
    }
}

/// Parameters of one offer: the generic list (only when a goods group is known) plus the wiper extras.
pub fn offer_params(
    pos: &Position,
    props: &Properties,
    pns: &HashMap<String, String>,
    source: DescriptionSource,
) -> Vec<Param> {
    let has_group = !(pos.goods_group_code.is_empty() || pos.goods_group_code == "others")
        || props.goods_group().is_some();

    let mut params = if has_group {
        build_params(props, pns, source)
    } else {
        Vec::new()
    };

    if in_group(pos, props, "wipers") {
        params.extend(wipers::extra_params(&pos.brand));
    }
    params
}

/// Runs every family mapper that applies to the position.
///
/// `props` is the translated bag, `raw` the untranslated one (OEM and ASTM specs
/// are looked up by their catalog codes).
pub fn apply_families(
    offer: &mut Offer,
    pos: &Position,
    props: &Properties,
    raw: &Properties,
    env: &MapperEnv<'_>,
) -> Result<(), SkipReason> {
    if in_group(pos, props, "bicycles") {
        offer.vehicle_type = vehicle_type(props).to_string();
    }

    fluids::apply(offer, pos, props, raw, env.reference);

    if in_group(pos, props, "batteries") {
        batteries::apply(offer, props);
    }
    if in_group(pos, props, "wipers") {
        wipers::apply(offer, props, &pos.brand);
    }

    wheels::apply(offer, pos, props, env)?;

    if !pos.is_tires() && !pos.is_disks() && !pos.is_oils() && !in_group(pos, props, "bicycles") {
        offer.oem = pos.number.clone();
    }
    Ok(())
}

fn vehicle_type(props: &Properties) -> &'static str {
    match props.text("age") {
        Some("для детей") | Some("для подростков") => return "Детские",
        _ => {}
    }
    match props.text("type") {
        Some("горный") => "Горные",
        Some("bmx") => "BMX",
        _ => "Дорожные",
    }
}
