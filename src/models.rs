//! Typed view of the `window.detailData` document.
//!
//! Only the paths the archiver reads are modelled. Optional sections default
//! to empty, so a missing ladder or property list is not an error; a missing
//! product, id or subject is.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailData {
    pub global_data: GlobalData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalData {
    pub product: Product,
    #[serde(default)]
    pub trade: Trade,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "product_id")]
    pub product_id: u64,
    pub subject: String,
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub product_key_industry_properties: Vec<Attribute>,
    #[serde(default)]
    pub product_basic_properties: Vec<Attribute>,
    #[serde(default)]
    pub product_light_customization_list: Vec<Customization>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(default)]
    pub product_ladder_prices: Vec<LadderPrice>,
}

/// One quantity tier. A negative `max` means "and above".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderPrice {
    pub min: f64,
    pub max: f64,
    pub format_price: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub attr_name: String,
    pub attr_value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub custom_type: String,
    pub moq: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(default)]
    pub logistic_info: LogisticInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticInfo {
    #[serde(default)]
    pub product_packaging_properties: Vec<Attribute>,
    #[serde(default)]
    pub supply_ability: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaItem {
    #[serde(rename_all = "camelCase")]
    Video {
        #[serde(default)]
        video_url: BTreeMap<String, VideoVariant>,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        #[serde(default)]
        image_url: BTreeMap<String, Option<String>>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoVariant {
    pub video_url: String,
}

/// Summary written next to the report as `<id>.json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub product_id: u64,
    pub title: String,
    pub source_url: String,
    pub media: Vec<String>,
    pub archived_at: String,
}

/// Product ids show up as JSON numbers (sometimes floats) or numeric strings.
fn product_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(id) => Ok(id),
        RawId::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        RawId::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        RawId::Float(f) => Err(serde::de::Error::custom(format!(
            "product id {f} is not a whole number"
        ))),
    }
}
