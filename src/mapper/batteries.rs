use crate::model::{Offer, Properties};

fn polarity(value: &str) -> &'static str {
    match value {
        "inverse" | "обратная" => "Обратная",
        "direct" | "прямая" => "Прямая",
        "universal" | "универсальная" => "Двойная",
        _ => "",
    }
}

pub fn apply(offer: &mut Offer, props: &Properties) {
    if let Some(voltage) = props.scalar("voltage") {
        offer.voltage = voltage.replace(['V', 'В'], "");
    }
    if let Some(capacity) = props.scalar("capacity") {
        offer.capacity = capacity;
    }
    if let Some(cca) = props.scalar("cca") {
        offer.dcl = cca;
    }
    if let Some(value) = props.text("polarity") {
        offer.polarity = polarity(value).to_string();
    }
    if let Some(length) = props.scalar("length") {
        offer.technic_length = length;
    }
    if let Some(width) = props.scalar("width") {
        offer.technic_width = width;
    }
    if let Some(height) = props.scalar("height") {
        offer.technic_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropValue;

    #[test]
    fn battery_fields() {
        let props = Properties::from([
            ("voltage", PropValue::Text("12V".into())),
            ("capacity", PropValue::Number(60.0)),
            ("cca", PropValue::Text("540".into())),
            ("polarity", PropValue::Text("обратная".into())),
            ("length", PropValue::Text("242".into())),
            ("width", PropValue::Text("175".into())),
            ("height", PropValue::Text("190".into())),
        ]);
        let mut offer = Offer::default();
        apply(&mut offer, &props);

        assert_eq!(offer.voltage, "12");
        assert_eq!(offer.capacity, "60");
        assert_eq!(offer.dcl, "540");
        assert_eq!(offer.polarity, "Обратная");
        assert_eq!(
            (offer.technic_length.as_str(), offer.technic_width.as_str(), offer.technic_height.as_str()),
            ("242", "175", "190")
        );
    }

    #[test]
    fn unknown_polarity_is_blank() {
        let props = Properties::from([
            ("polarity", PropValue::Text("left".into())),
            ("voltage", PropValue::Text("6В".into())),
        ]);
        let mut offer = Offer::default();
        apply(&mut offer, &props);
        assert_eq!(offer.polarity, "");
        assert_eq!(offer.voltage, "6");
    }
}
