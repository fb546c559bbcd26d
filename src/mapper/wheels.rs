// Tires, disks and wheel covers.
use super::{MapperEnv, TireSettings};
use crate::model::{Offer, Position, Properties, SkipReason};
use crate::normalizer::normalize_tire_model;
use chrono::{Datelike, Months, NaiveDate};
use tracing::warn;

fn tire_type(season: &str) -> &'static str {
    match season {
        "всесезонная" => "Всесезонные",
        "зимняя нешипованная" => "Зимние нешипованные",
        "зимняя шипованная" => "Зимние шипованные",
        "летняя" => "Летние",
        _ => "",
    }
}

fn rim_type(disk_type: &str) -> &'static str {
    match disk_type {
        "литой" => "Литые",
        "штампованный" => "Штампованные",
        "кованый" => "Кованые",
        _ => "",
    }
}

/// Configured tire year, or the year six months before `today`.
pub fn resolve_tire_year(configured: &str, today: NaiveDate) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    today
        .checked_sub_months(Months::new(6))
        .unwrap_or(today)
        .year()
        .to_string()
}

/// Tires per offer. `None` when the packing cannot be read as a number.
pub fn tire_quantity(settings: &TireSettings, packing: &str) -> Option<i64> {
    if settings.quantity_type != 0 {
        return Some(settings.quantity.max(1));
    }
    match packing.trim().parse() {
        Ok(quantity) => Some(quantity),
        Err(e) => {
            warn!(packing, "Could not parse tire packing: {}", e);
            None
        }
    }
}

fn set_scalar(field: &mut String, props: &Properties, name: &str) {
    if let Some(value) = props.scalar(name) {
        *field = value;
    }
}

pub fn apply(
    offer: &mut Offer,
    pos: &Position,
    props: &Properties,
    env: &MapperEnv<'_>,
) -> Result<(), SkipReason> {
    if props.goods_group() == Some("wheel_covers") {
        set_scalar(&mut offer.rim_diameter, props, "diameter");
    }

    let tires = pos.is_tires();
    let disks = pos.is_disks();
    if !tires && !disks {
        return Ok(());
    }

    set_scalar(&mut offer.wheel_axle, props, "axle");
    match pos.goods_group_code.as_str() {
        "tires" => {
            if let Some(season) = props.text("season") {
                offer.tire_type = tire_type(season).to_string();
            }
        }
        "truck_tires" => offer.tire_type = "Всесезонные".to_string(),
        _ => {}
    }
    set_scalar(&mut offer.rim_diameter, props, "diameter");
    if let Some(disk_type) = props.text("disk_type") {
        offer.rim_type = rim_type(disk_type).to_string();
    }
    set_scalar(&mut offer.rim_bolts, props, "holes");
    set_scalar(&mut offer.rim_bolts_diameter, props, "pcd");
    set_scalar(&mut offer.rim_offset, props, "et");

    if tires {
        let model = props.scalar("catalog_model").unwrap_or_default();
        offer.model = normalize_tire_model(&model, &env.reference.tire_models);
        if pos.is_used() {
            offer.tire_year = env.tires.year.clone();
        }

        set_scalar(&mut offer.tire_section_width, props, "width");
        set_scalar(&mut offer.tire_aspect_ratio, props, "height");
        if offer.tire_section_width == "0" || offer.tire_aspect_ratio == "0" {
            return Err(SkipReason::InvalidDimensions);
        }
        offer.quantity = tire_quantity(env.tires, &pos.packing);
    }

    if disks {
        set_scalar(&mut offer.rim_width, props, "width");
        set_scalar(&mut offer.rim_dia, props, "hub_diameter");
        if offer.rim_width == "0" {
            return Err(SkipReason::InvalidDimensions);
        }
    }
    Ok(())
}
