use super::Param;
use crate::model::{Offer, PropValue, Properties};
use crate::utils::title_case;
use tracing::warn;

const WINDSHIELD: &str = "Лобовое стекло";

/// Catalog connector names -> marketplace mounting types.
const MOUNTING_TYPES: &[(&str, &str)] = &[
    ("j-hook (крючок)", "Hook 9x4"),
    ("bayonet (штыковой замок)", "Bayonet arm"),
    ("side pin (боковой штырь) 22мм", "Side pin 22"),
    ("push button (кнопка) 19мм", "Push button 16"),
    ("narrow push putton (узкая кнопка) 16мм", "Narrow push button"),
    ("pinch tab (боковой зажим)", "Pinch tab"),
    ("top lock (верхний замок)", "Top lock"),
    ("claw (клешня)", "Claw"),
    ("pin lock (штырь)", "Pin lock"),
    ("side pin (боковой штырь) 17мм", "Side pin 17"),
    ("side mounting (боковое крепление)", "Side mounting"),
    ("GWB046 (VATL5.1)", "VATL 5.1"),
    ("special (специальное)", "Hook 9x4"),
    ("штырь 4.8/6.5 мм", "Pin lock"),
    ("GWB044 (DNTL1.1)", "DNTL 1.1"),
    ("GWB045 (MBTL1.1)", "MBTL 1.1"),
    ("DYTL1.1", "DYTL 1.1"),
    ("грузовой крючок 27/6", "Hook 9x4"),
    ("AeroClip (АэроКлип)", "AeroClip"),
    ("GWB071", "Hook 9x4"),
    ("грузовой крючок 25/6", "Hook 9x4"),
    ("грузовой крючок 22/6", "Hook 9x4"),
    ("RBTL2.0 (19мм)", "Hook 9x4"),
];

pub fn mounting_type(connector: &str) -> Option<&'static str> {
    MOUNTING_TYPES
        .iter()
        .find(|(name, _)| *name == connector)
        .map(|(_, mounting)| *mounting)
}

/// Parameters every wiper offer carries regardless of enrichment.
pub fn extra_params(brand: &str) -> [Param; 2] {
    [
        Param::new("Место установки", WINDSHIELD),
        Param::new("Производитель", brand),
    ]
}

fn set_flag(pack_count: Option<&str>) -> &'static str {
    match pack_count {
        Some("1") => "Нет",
        Some("2") => "Да",
        _ => "",
    }
}

fn brush_length(props: &Properties, name: &str) -> Option<u32> {
    match props.get(name)? {
        PropValue::Number(n) if *n >= 0.0 => Some(*n as u32),
        PropValue::Text(text) => match text.trim().parse() {
            Ok(length) => Some(length),
            Err(e) => {
                warn!(property = name, value = %text, "Could not parse wiper brush length: {}", e);
                None
            }
        },
        _ => None,
    }
}

pub fn apply(offer: &mut Offer, props: &Properties, brand: &str) {
    offer.installation_location = WINDSHIELD.to_string();
    offer.set = set_flag(props.scalar("pack_count").as_deref()).to_string();

    if let Some(connector) = props.first_text("connector") {
        offer.mounting_type = mounting_type(connector).unwrap_or_default().to_string();
    }
    if let Some(construction) = props.text("construction") {
        offer.brush_type = title_case(construction);
    }

    offer.brush_length = brush_length(props, "length1");
    if offer.set == "Да" {
        offer.second_brush_length = brush_length(props, "length2");
    }
    offer.brush_brand = brand.to_string();
}
