// XML serialization of offer batches with quick-xml.
use crate::model::{FeedError, Offer, SpecValue, StockOffer};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const STOCK_CLASS: &str = " FB_FW_ext Bco";

/// A record the output writer can serialize.
pub trait FeedRecord {
    /// Identity used for per-batch deduplication.
    fn id(&self) -> &str;
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), FeedError>;
}

/// Root element of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Ads,
    /// Stock update, stamped with the generation time (`%Y-%m-%dT%H:%M:%S`).
    Stock { date: String },
}

impl Document {
    fn header(&self) -> String {
        match self {
            Document::Ads => format!("{}<Ads formatVersion=\"3\" target=\"Avito.ru\">\n", XML_DECLARATION),
            Document::Stock { date } => {
                format!(
                    "{}<items date=\"{}\" formatVersion=\"1\" class=\"{}\">\n",
                    XML_DECLARATION, date, STOCK_CLASS
                )
            }
        }
    }

    fn footer(&self) -> &'static str {
        match self {
            Document::Ads => "\n</Ads>",
            Document::Stock { .. } => "\n</items>",
        }
    }
}

/// Appends batches to an output document between its header and footer.
pub struct FeedWriter<W: Write> {
    writer: Writer<W>,
    document: Document,
    written: usize,
}

impl<W: Write> FeedWriter<W> {
    /// Writes the document header.
    pub fn new(mut inner: W, document: Document) -> Result<Self, FeedError> {
        inner.write_all(document.header().as_bytes())?;
        Ok(Self {
            writer: Writer::new_with_indent(inner, b' ', 4),
            document,
            written: 0,
        })
    }

    pub fn write_batch<R: FeedRecord>(&mut self, records: &[R]) -> Result<(), FeedError> {
        for record in records {
            record.write_xml(&mut self.writer)?;
        }
        self.written += records.len();
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Writes the footer and hands back the sink with the number of records written.
    pub fn finish(self) -> Result<(W, usize), FeedError> {
        let mut inner = self.writer.into_inner();
        inner.write_all(self.document.footer().as_bytes())?;
        inner.flush()?;
        Ok((inner, self.written))
    }
}

fn start<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), FeedError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), FeedError> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `<name>value</name>`, skipped when the value is empty.
fn text_element<W: Write>(w: &mut Writer<W>, name: &str, value: &str) -> Result<(), FeedError> {
    if value.is_empty() {
        return Ok(());
    }
    start(w, name)?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    end(w, name)
}

fn number_element<W: Write, N: ToString>(
    w: &mut Writer<W>,
    name: &str,
    value: Option<N>,
) -> Result<(), FeedError> {
    match value {
        Some(value) => text_element(w, name, &value.to_string()),
        None => Ok(()),
    }
}

/// `<name><item>a</item>...</name>`, skipped when there are no values.
fn list_element<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    item: &str,
    values: &[String],
) -> Result<(), FeedError> {
    if values.is_empty() {
        return Ok(());
    }
    start(w, name)?;
    for value in values {
        text_element(w, item, value)?;
    }
    end(w, name)
}

impl FeedRecord for Offer {
    fn id(&self) -> &str {
        &self.id
    }

    fn write_xml<W: Write>(&self, w: &mut Writer<W>) -> Result<(), FeedError> {
        start(w, "Ad")?;
        text_element(w, "Id", &self.id)?;
        text_element(w, "DateEnd", &self.date_end)?;
        text_element(w, "ListingFee", &self.listing_fee)?;
        text_element(w, "AdStatus", &self.ad_status)?;
        text_element(w, "ContactMethod", &self.contact_method)?;
        text_element(w, "ManagerName", &self.manager_name)?;
        text_element(w, "ContactPhone", &self.contact_phone)?;
        text_element(w, "Address", &self.address)?;
        list_element(w, "Addresses", "Option", &self.addresses)?;
        list_element(w, "DisplayAreas", "Area", &self.display_areas)?;

        text_element(w, "Category", &self.category)?;
        text_element(w, "GoodsType", &self.goods_type)?;
        text_element(w, "ProductType", &self.product_type)?;
        text_element(w, "SparePartType", &self.spare_part_type)?;
        text_element(w, "TechnicSparePartType", &self.technic_spare_part_type)?;
        text_element(w, "BodySparePartType", &self.body_spare_part_type)?;
        text_element(w, "EngineSparePartType", &self.engine_spare_part_type)?;
        text_element(w, "TransmissionSparePartType", &self.transmission_spare_part_type)?;
        text_element(w, "TrunkType", &self.trunk_type)?;
        text_element(w, "AccessoryType", &self.accessory_type)?;
        text_element(w, "DeviceType", &self.device_type)?;
        text_element(w, "InstallationLocation", &self.installation_location)?;
        text_element(w, "VehicleType", &self.vehicle_type)?;

        text_element(w, "AdType", &self.ad_type)?;
        text_element(w, "Title", &self.title)?;
        if !self.description.is_empty() {
            start(w, "Description")?;
            // `]]>` inside the text is split across sections
            for section in BytesCData::escaped(&self.description) {
                w.write_event(Event::CData(section))?;
            }
            end(w, "Description")?;
        }
        number_element(w, "Price", self.price)?;
        text_element(w, "Condition", &self.condition)?;
        text_element(w, "Availability", &self.availability)?;

        if !self.images.is_empty() {
            start(w, "Images")?;
            for url in &self.images {
                let image = BytesStart::new("Image").with_attributes([("url", url.as_str())]);
                w.write_event(Event::Empty(image))?;
            }
            end(w, "Images")?;
        }
        text_element(w, "VideoURL", &self.video_url)?;

        text_element(w, "Brand", &self.brand)?;
        text_element(w, "RimBrand", &self.rim_brand)?;
        text_element(w, "OEM", &self.oem)?;
        text_element(w, "VendorCode", &self.vendor_code)?;

        text_element(w, "ATF", &self.atf)?;
        text_element(w, "Volume", &self.volume)?;
        text_element(w, "SAE", &self.sae)?;
        text_element(w, "ACEA", &self.acea)?;
        match &self.api {
            Some(SpecValue::Single(value)) => text_element(w, "API", value)?,
            Some(SpecValue::Options(values)) => list_element(w, "API", "Option", values)?,
            None => {}
        }
        text_element(w, "DOT", &self.dot)?;
        text_element(w, "Color", &self.color)?;
        list_element(w, "OEMOil", "Option", &self.oem_oil)?;
        list_element(w, "ASTM", "Option", &self.astm)?;

        text_element(w, "Voltage", &self.voltage)?;
        text_element(w, "Capacity", &self.capacity)?;
        text_element(w, "DCL", &self.dcl)?;
        text_element(w, "Polarity", &self.polarity)?;
        text_element(w, "TechnicLength", &self.technic_length)?;
        text_element(w, "TechnicWidth", &self.technic_width)?;
        text_element(w, "TechnicHeight", &self.technic_height)?;

        text_element(w, "Set", &self.set)?;
        text_element(w, "MountingType", &self.mounting_type)?;
        text_element(w, "BrushType", &self.brush_type)?;
        number_element(w, "BrushLength", self.brush_length)?;
        number_element(w, "SecondBrushLength", self.second_brush_length)?;
        text_element(w, "BrushBrand", &self.brush_brand)?;

        text_element(w, "Model", &self.model)?;
        text_element(w, "TireYear", &self.tire_year)?;
        number_element(w, "Quantity", self.quantity)?;
        text_element(w, "TireType", &self.tire_type)?;
        text_element(w, "TireSectionWidth", &self.tire_section_width)?;
        text_element(w, "TireAspectRatio", &self.tire_aspect_ratio)?;
        text_element(w, "RimDiameter", &self.rim_diameter)?;
        text_element(w, "WheelAxle", &self.wheel_axle)?;
        text_element(w, "RimType", &self.rim_type)?;
        text_element(w, "RimBolts", &self.rim_bolts)?;
        text_element(w, "RimBoltsDiameter", &self.rim_bolts_diameter)?;
        text_element(w, "RimOffset", &self.rim_offset)?;
        text_element(w, "RimWidth", &self.rim_width)?;
        text_element(w, "RimDIA", &self.rim_dia)?;

        text_element(w, "InternetCalls", &self.internet_calls)?;
        list_element(w, "CallsDevices", "Option", &self.calls_devices)?;
        if let Some(delivery) = &self.delivery {
            list_element(w, "Delivery", "Option", delivery)?;
        }
        end(w, "Ad")
    }
}

impl FeedRecord for StockOffer {
    fn id(&self) -> &str {
        &self.id
    }

    fn write_xml<W: Write>(&self, w: &mut Writer<W>) -> Result<(), FeedError> {
        start(w, "item")?;
        text_element(w, "id", &self.id)?;
        text_element(w, "stock", &self.stock.to_string())?;
        end(w, "item")
    }
}
