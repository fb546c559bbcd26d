// Task-global listing fields, offer identity and delivery bands.
use crate::config::{DeliveryBand, FeedConfig, OfferIdStrategy};
use crate::model::{FeedError, Offer, Position};
use chrono::{Duration, NaiveDate};

pub const ADDRESS_LIMIT: usize = 256;
pub const MANAGER_NAME_LIMIT: usize = 40;
pub const MAX_ADDRESSES: usize = 10;
const OFFER_ID_HASH_LEN: usize = 20;

const AD_STATUSES: [&str; 18] = [
    "Free", "Premium", "VIP", "PushUp", "Highlight", "TurboSale", "QuickSale", "XL", "x2_1",
    "x2_7", "x5_1", "x5_7", "x10_1", "x10_7", "x15_1", "x15_7", "x20_1", "x20_7",
];

pub fn contact_method(code: u8) -> &'static str {
    match code {
        0 => "По телефону и в сообщениях",
        1 => "По телефону",
        2 => "В сообщениях",
        _ => "",
    }
}

pub fn ad_type(code: u8) -> &'static str {
    match code {
        0 => "Товар приобретен на продажу",
        1 => "Товар от производителя",
        _ => "",
    }
}

pub fn ad_status(code: u8) -> &'static str {
    AD_STATUSES.get(usize::from(code)).copied().unwrap_or_default()
}

pub fn listing_fee(code: u8) -> &'static str {
    match code {
        1 => "Package",
        2 => "PackageSingle",
        3 => "Single",
        _ => "",
    }
}

pub fn condition(code: u8) -> &'static str {
    match code {
        0 => "Новое",
        1 => "Б/у",
        _ => "",
    }
}

/// Окончание размещения: коды 1-7 в днях, 8 и 9 - десять и четырнадцать дней, 10 - вчера.
pub fn date_end(today: NaiveDate, code: u8) -> String {
    let days = match code {
        1..=7 => i64::from(code),
        8 => 10,
        9 => 14,
        10 => -1,
        _ => return String::new(),
    };
    (today + Duration::days(days)).format("%Y-%m-%d").to_string()
}

pub fn availability(code: u8, dead_line: i32) -> &'static str {
    match code {
        0 if dead_line > 0 => "Под заказ",
        0 | 1 => "В наличии",
        2 => "Под заказ",
        _ => "",
    }
}

pub fn internet_calls(enabled: bool) -> &'static str {
    if enabled { "Да" } else { "Нет" }
}

/// Unique trimmed addresses of 1..=256 characters, at most ten.
pub fn additional_addresses(addresses: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for address in addresses.iter().map(|a| a.trim()) {
        let len = address.chars().count();
        if len == 0 || len > ADDRESS_LIMIT || out.iter().any(|a| a == address) {
            continue;
        }
        out.push(address.to_string());
        if out.len() == MAX_ADDRESSES {
            break;
        }
    }
    out
}

fn short_md5(data: &str) -> String {
    let digest = format!("{:x}", md5::compute(data.as_bytes()));
    digest[..OFFER_ID_HASH_LEN].to_string()
}

fn warehouse_code_id(pos: &Position) -> String {
    let code = pos.code.trim();
    if !code.is_empty() {
        return code.to_string();
    }
    let brand = pos.brand.replace('ё', "е").replace('&', "_").replace(' ', "");
    format!("{}-{}", brand, pos.number)
}

pub fn offer_id(pos: &Position, strategy: OfferIdStrategy) -> String {
    match strategy {
        OfferIdStrategy::RouteHash => {
            short_md5(&format!("{}{}{}", pos.number, pos.brand, pos.route_id))
        }
        OfferIdStrategy::Hash => short_md5(&format!("{}{}", pos.number, pos.brand)),
        OfferIdStrategy::BrandNumber => format!("{}_{}", pos.brand, pos.number),
        OfferIdStrategy::WarehouseCode => warehouse_code_id(pos),
    }
}

/// Delivery types of the first band with `min <= price < max` (`max == 0` is unbounded).
pub fn delivery_for_price(bands: &[DeliveryBand], price: i64) -> Option<Vec<String>> {
    bands
        .iter()
        .find(|band| {
            price >= band.min_price as i64
                && (price < band.max_price as i64 || band.max_price == 0.0)
        })
        .map(|band| band.delivery_types.clone())
}

/// Fields shared by every offer of a task, resolved once at Init.
#[derive(Debug, Clone)]
pub struct ListingTemplate {
    pub address: String,
    pub addresses: Vec<String>,
    pub display_areas: Vec<String>,
    pub contact_phone: String,
    pub manager_name: String,
    pub date_end: String,
    pub listing_fee: String,
    pub ad_status: String,
    pub contact_method: String,
    pub ad_type: String,
    pub condition: String,
    pub video_url: String,
    pub internet_calls: String,
    pub calls_devices: Vec<String>,
    pub availability_code: u8,
    pub offer_id_strategy: OfferIdStrategy,
    pub delivery_bands: Vec<DeliveryBand>,
    pub hide_price: bool,
    pub pre_owned_label: String,
}

impl ListingTemplate {
    /// Fails when the address or manager name exceed the marketplace limits.
    pub fn new(feed: &FeedConfig, today: NaiveDate, pre_owned_label: &str) -> Result<Self, FeedError> {
        if feed.address.chars().count() > ADDRESS_LIMIT {
            return Err(FeedError::FieldTooLong {
                field: "address",
                limit: ADDRESS_LIMIT,
            });
        }
        if feed.manager_name.chars().count() > MANAGER_NAME_LIMIT {
            return Err(FeedError::FieldTooLong {
                field: "managerName",
                limit: MANAGER_NAME_LIMIT,
            });
        }

        Ok(Self {
            address: feed.address.clone(),
            addresses: additional_addresses(&feed.additional_addresses),
            display_areas: feed.display_areas.clone(),
            contact_phone: feed.contact_phone.clone(),
            manager_name: feed.manager_name.clone(),
            date_end: date_end(today, feed.date_end),
            listing_fee: listing_fee(feed.listing_fee).to_string(),
            ad_status: ad_status(feed.ad_status).to_string(),
            contact_method: contact_method(feed.contact_method).to_string(),
            ad_type: ad_type(feed.ad_type).to_string(),
            condition: condition(feed.condition).to_string(),
            video_url: feed.video_url.clone(),
            internet_calls: internet_calls(feed.internet_calls).to_string(),
            calls_devices: feed.calls_devices.clone(),
            availability_code: feed.availability,
            offer_id_strategy: feed.offer_id_strategy,
            delivery_bands: feed.delivery_from_prices.clone(),
            hide_price: feed.hide_price_tag,
            pre_owned_label: pre_owned_label.to_string(),
        })
    }

    /// New offer with the listing fields of `pos` filled in.
    pub fn offer_for(&self, pos: &Position) -> Offer {
        let mut offer = Offer {
            id: offer_id(pos, self.offer_id_strategy),
            address: self.address.clone(),
            addresses: self.addresses.clone(),
            display_areas: self.display_areas.clone(),
            contact_phone: self.contact_phone.clone(),
            manager_name: self.manager_name.clone(),
            date_end: self.date_end.clone(),
            listing_fee: self.listing_fee.clone(),
            ad_status: self.ad_status.clone(),
            contact_method: self.contact_method.clone(),
            ad_type: self.ad_type.clone(),
            condition: self.condition.clone(),
            video_url: self.video_url.clone(),
            internet_calls: self.internet_calls.clone(),
            calls_devices: self.calls_devices.clone(),
            availability: availability(self.availability_code, pos.dead_line).to_string(),
            ..Offer::default()
        };

        if pos.is_disks() {
            offer.rim_brand = pos.brand.clone();
        } else {
            offer.brand = pos.brand.clone();
        }
        if pos.is_used() {
            offer.condition = self.pre_owned_label.clone();
        }
        offer
    }

    /// Sets price and delivery; `quantity` multiplies the price of tire sets.
    pub fn apply_price(&self, offer: &mut Offer, price_sale: f64) {
        let mut price = price_sale.ceil() as i64;
        if let Some(quantity) = offer.quantity {
            price *= quantity;
        }
        offer.delivery = delivery_for_price(&self.delivery_bands, price);
        offer.price = (!self.hide_price).then_some(price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(min: f64, max: f64, types: &[&str]) -> DeliveryBand {
        DeliveryBand {
            min_price: min,
            max_price: max,
            delivery_types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn delivery_bands_are_half_open() {
        let bands = [band(1000.0, 2500.0, &["A", "B"])];
        assert_eq!(delivery_for_price(&bands, 1500), Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(delivery_for_price(&bands, 2500), None);
        assert_eq!(delivery_for_price(&bands, 3000), None);

        let open = [band(1000.0, 2500.0, &["A"]), band(2500.0, 0.0, &["C"])];
        assert_eq!(delivery_for_price(&open, 3000), Some(vec!["C".to_string()]));
    }

    #[test]
    fn offer_ids() {
        let pos = Position {
            brand: "Mann & Hummel ё".into(),
            number: "W712".into(),
            route_id: 7,
            ..Position::default()
        };
        let a = offer_id(&pos, OfferIdStrategy::RouteHash);
        assert_eq!(a, offer_id(&pos.clone(), OfferIdStrategy::RouteHash));
        assert_eq!(a.len(), 20);
        assert_eq!(a, format!("{:x}", md5::compute("W712Mann & Hummel ё7"))[..20]);

        let other_route = Position { route_id: 8, ..pos.clone() };
        assert_ne!(a, offer_id(&other_route, OfferIdStrategy::RouteHash));
        assert_eq!(
            offer_id(&pos, OfferIdStrategy::Hash),
            offer_id(&other_route, OfferIdStrategy::Hash)
        );

        assert_eq!(offer_id(&pos, OfferIdStrategy::BrandNumber), "Mann & Hummel ё_W712");
        assert_eq!(offer_id(&pos, OfferIdStrategy::WarehouseCode), "Mann_Hummelе-W712");

        let coded = Position { code: "  WH-1 ".into(), ..pos };
        assert_eq!(offer_id(&coded, OfferIdStrategy::WarehouseCode), "WH-1");
    }

    #[test]
    fn date_end_codes() {
        assert_eq!(date_end(today(), 1), "2026-10-17");
        assert_eq!(date_end(today(), 8), "2026-10-26");
        assert_eq!(date_end(today(), 9), "2026-10-30");
        assert_eq!(date_end(today(), 10), "2026-10-15");
        assert_eq!(date_end(today(), 0), "");
    }

    #[test]
    fn availability_codes() {
        assert_eq!(availability(0, 3), "Под заказ");
        assert_eq!(availability(0, 0), "В наличии");
        assert_eq!(availability(1, 3), "В наличии");
        assert_eq!(availability(2, 0), "Под заказ");
    }

    #[test]
    fn addresses_are_unique_trimmed_and_limited() {
        let mut input: Vec<String> = vec![" Москва ".into(), "Москва".into(), "".into(), "x".repeat(257)];
        input.extend((0..12).map(|i| format!("Адрес {}", i)));
        let out = additional_addresses(&input);
        assert_eq!(out.len(), MAX_ADDRESSES);
        assert_eq!(out[0], "Москва");
        assert_eq!(out[1], "Адрес 0");
    }

    #[test]
    fn long_manager_name_is_fatal() {
        let feed = FeedConfig {
            manager_name: "м".repeat(41),
            ..FeedConfig::default()
        };
        assert!(matches!(
            ListingTemplate::new(&feed, today(), ""),
            Err(FeedError::FieldTooLong { field: "managerName", .. })
        ));
    }

    #[test]
    fn template_fills_offer_and_price() {
        let feed = FeedConfig {
            address: "Москва".into(),
            ad_status: 2,
            listing_fee: 1,
            internet_calls: true,
            delivery_from_prices: vec![band(0.0, 0.0, &["ПВЗ"])],
            ..FeedConfig::default()
        };
        let template = ListingTemplate::new(&feed, today(), "Б/у").unwrap();
        let disk = Position {
            brand: "KFZ".into(),
            goods_group_code: "disks".into(),
            condition: 30,
            ..Position::default()
        };
        let mut offer = template.offer_for(&disk);
        assert_eq!(offer.rim_brand, "KFZ");
        assert_eq!(offer.brand, "");
        assert_eq!(offer.condition, "Б/у");
        assert_eq!(offer.ad_status, "VIP");
        assert_eq!(offer.listing_fee, "Package");
        assert_eq!(offer.internet_calls, "Да");
        assert_eq!(offer.contact_method, "По телефону и в сообщениях");

        offer.quantity = Some(4);
        template.apply_price(&mut offer, 1499.2);
        assert_eq!(offer.price, Some(6000));
        assert_eq!(offer.delivery, Some(vec!["ПВЗ".to_string()]));

        let hidden = ListingTemplate {
            hide_price: true,
            ..template
        };
        hidden.apply_price(&mut offer, 10.0);
        assert_eq!(offer.price, None);
    }
}
