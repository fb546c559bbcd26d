// Oils, gear oils, compressor oils, brake fluids and coolant.
use super::in_group;
use crate::model::{Offer, Position, PropValue, Properties, SpecValue};
use crate::reference::ReferenceData;
use crate::utils::replace_separator_to_comma;
use std::collections::HashMap;

const SAE_NOT_CLASSIFIED: &str = "Не подлежит классификации по SAE";

fn volume(props: &Properties) -> Option<String> {
    props
        .scalar("liquid_volume")
        .map(|v| format!("{} л", replace_separator_to_comma(&v)))
}

fn sae(value: &PropValue) -> String {
    match value {
        PropValue::List(items) => items.join(","),
        other => other.to_scalar_string().unwrap_or_default(),
    }
}

fn gear_oil_sae(value: Option<&PropValue>) -> String {
    match value {
        Some(PropValue::Text(text)) if text.trim().is_empty() => SAE_NOT_CLASSIFIED.to_string(),
        Some(value) => sae(value),
        None => SAE_NOT_CLASSIFIED.to_string(),
    }
}

/// Single option as a bare value, two or more as a list of options.
pub fn api_spec(value: Option<&PropValue>) -> Option<SpecValue> {
    match value? {
        PropValue::Text(text) => Some(SpecValue::Single(text.clone())),
        PropValue::List(items) => match items.as_slice() {
            [] => None,
            [single] => Some(SpecValue::Single(single.clone())),
            many => Some(SpecValue::Options(many.to_vec())),
        },
        PropValue::Number(_) => None,
    }
}

/// Maps catalog spec codes through `table`; unknown codes pass through.
fn map_specs(value: Option<&PropValue>, table: &HashMap<String, String>) -> Vec<String> {
    match value {
        Some(PropValue::List(items)) => items
            .iter()
            .map(|code| table.get(code).unwrap_or(code).clone())
            .collect(),
        _ => Vec::new(),
    }
}

fn set_volume(offer: &mut Offer, props: &Properties) {
    if let Some(volume) = volume(props) {
        offer.volume = volume;
    }
}

pub fn apply(
    offer: &mut Offer,
    pos: &Position,
    props: &Properties,
    raw: &Properties,
    reference: &ReferenceData,
) {
    let gear_oils = in_group(pos, props, "gear_oils");
    let oils = in_group(pos, props, "oils");

    if gear_oils {
        if let Some(code) = props.first_text("atf_spec") {
            offer.atf = reference
                .atf_spec
                .get(code)
                .cloned()
                .unwrap_or_else(|| code.to_string());
        }
    }

    if in_group(pos, props, "compressor_oils") {
        set_volume(offer, props);
    }

    if oils {
        if let Some(viscosity) = props.get("viscosity") {
            offer.sae = sae(viscosity);
        }
        set_volume(offer, props);
        if let Some(acea) = props.first_text("acea_spec") {
            offer.acea = acea.to_string();
        }
        offer.vendor_code = pos.number.clone();
    }

    if gear_oils {
        offer.sae = gear_oil_sae(props.get("viscosity"));
        set_volume(offer, props);
        offer.vendor_code = pos.number.clone();
    }

    if in_group(pos, props, "brake_fluids") {
        if let Some(dot) = props.first_text("dot_spec") {
            offer.dot = dot.to_string();
        }
        set_volume(offer, props);
        offer.vendor_code = pos.number.clone();
    }

    let coolant = in_group(pos, props, "coolant");
    if coolant {
        if let Some(color) = props.text("coolant_color") {
            offer.color = color.to_string();
        }
        set_volume(offer, props);
        offer.vendor_code = pos.number.clone();
    }

    if oils || gear_oils {
        offer.api = api_spec(props.get("api_spec"));
    }

    if pos.is_oils() {
        let oem_key = if pos.goods_group_code == "coolant" {
            "coolant_oem_spec"
        } else {
            "oem_spec"
        };
        offer.oem_oil = map_specs(raw.get(oem_key), &reference.oem_spec);

        if pos.goods_group_code == "coolant" {
            if let Some(astm) = raw.list("coolant_astm_spec") {
                offer.astm = astm.to_vec();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oil_position(group: &str) -> Position {
        Position {
            brand: "BRAND1".into(),
            number: "NUM1".into(),
            goods_group_code: group.into(),
            ..Position::default()
        }
    }

    #[test]
    fn motor_oil_fields() {
        let props = Properties::from([
            ("goods_group", PropValue::Text("oils".into())),
            ("viscosity", PropValue::Text("5W-30".into())),
            ("liquid_volume", PropValue::Text("4.0".into())),
            ("acea_spec", PropValue::Text("A3/B4".into())),
            ("api_spec", PropValue::List(vec!["SN".into()])),
        ]);
        let mut offer = Offer::default();
        apply(&mut offer, &oil_position("oils"), &props, &props, &ReferenceData::default());

        assert_eq!(offer.sae, "5W-30");
        assert_eq!(offer.volume, "4,0 л");
        assert_eq!(offer.acea, "A3/B4");
        assert_eq!(offer.vendor_code, "NUM1");
        assert_eq!(offer.api, Some(SpecValue::Single("SN".into())));
    }

    #[test]
    fn gear_oil_defaults_and_atf_mapping() {
        let mut reference = ReferenceData::default();
        reference.atf_spec.insert("dexron_3".into(), "Dexron III".into());
        let props = Properties::from([
            ("atf_spec", PropValue::List(vec!["dexron_3".into(), "mercon".into()])),
            ("viscosity", PropValue::Text("  ".into())),
            ("api_spec", PropValue::List(vec!["GL-4".into(), "GL-5".into()])),
        ]);
        let mut offer = Offer::default();
        apply(&mut offer, &oil_position("gear_oils"), &props, &props, &reference);

        assert_eq!(offer.atf, "Dexron III");
        assert_eq!(offer.sae, SAE_NOT_CLASSIFIED);
        assert_eq!(
            offer.api,
            Some(SpecValue::Options(vec!["GL-4".into(), "GL-5".into()]))
        );
    }

    #[test]
    fn coolant_reads_oem_and_astm_from_untranslated_bag() {
        let mut reference = ReferenceData::default();
        reference.oem_spec.insert("vw_tl_774_g".into(), "VW TL 774-G".into());
        let raw = Properties::from([
            ("coolant_color", PropValue::Text("red".into())),
            ("coolant_oem_spec", PropValue::List(vec!["vw_tl_774_g".into(), "other".into()])),
            ("coolant_astm_spec", PropValue::List(vec!["D3306".into()])),
        ]);
        let translated = Properties::from([("coolant_color", PropValue::Text("красный".into()))]);
        let mut offer = Offer::default();
        apply(&mut offer, &oil_position("coolant"), &translated, &raw, &reference);

        assert_eq!(offer.color, "красный");
        assert_eq!(offer.oem_oil, ["VW TL 774-G", "other"]);
        assert_eq!(offer.astm, ["D3306"]);
        assert_eq!(offer.vendor_code, "NUM1");
        assert_eq!(offer.api, None);
    }

    #[test]
    fn brake_fluid_dot_takes_first_option() {
        let props = Properties::from([
            ("dot_spec", PropValue::List(vec!["DOT 4".into(), "DOT 3".into()])),
            ("liquid_volume", PropValue::Number(0.5)),
        ]);
        let mut offer = Offer::default();
        apply(&mut offer, &oil_position("brake_fluids"), &props, &props, &ReferenceData::default());

        assert_eq!(offer.dot, "DOT 4");
        assert_eq!(offer.volume, "0,5 л");
        assert!(offer.oem_oil.is_empty());
    }
}
