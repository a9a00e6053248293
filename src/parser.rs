use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::{ArchiveError, Result};
use crate::models::DetailData;

/// Global the product page assigns its state to.
pub const DETAIL_DATA_MARKER: &str = "window.detailData";

lazy_static! {
    static ref SCRIPT_SELECTOR: Selector = Selector::parse("script").unwrap();
    static ref KEYWORDS_SELECTOR: Selector = Selector::parse(r#"meta[name="keywords"]"#).unwrap();
    static ref DESCRIPTION_SELECTOR: Selector =
        Selector::parse(r#"meta[name="description"]"#).unwrap();
    static ref DETAIL_DATA_RE: Regex = Regex::new(r"(?s)window\.detailData\s*=\s*(.*)").unwrap();
}

/// Strategy for pulling the embedded state document out of a product page.
pub trait EmbeddedDataSource {
    fn extract(&self, document: &Html) -> Result<Value>;
}

/// Finds the first `<script>` mentioning the marker and decodes the JSON
/// assigned to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptAssignmentExtractor;

impl EmbeddedDataSource for ScriptAssignmentExtractor {
    fn extract(&self, document: &Html) -> Result<Value> {
        let script = document
            .select(&SCRIPT_SELECTOR)
            .map(|s| s.text().collect::<String>())
            .find(|text| text.contains(DETAIL_DATA_MARKER))
            .ok_or_else(|| ArchiveError::MarkerNotFound(DETAIL_DATA_MARKER.to_string()))?;

        let json = embedded_json(&script)?;
        tracing::debug!("found {} ({} bytes)", DETAIL_DATA_MARKER, json.len());
        Ok(serde_json::from_str(json)?)
    }
}

/// The exact JSON text assigned to the marker. Anything after the first
/// complete value (`;`, further statements) is not part of it.
pub fn embedded_json(script: &str) -> Result<&str> {
    let rest = DETAIL_DATA_RE
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ArchiveError::MarkerNotFound(DETAIL_DATA_MARKER.to_string()))?;

    let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    match values.next() {
        Some(Ok(_)) => Ok(rest[..values.byte_offset()].trim_start()),
        Some(Err(e)) => Err(e.into()),
        None => Err(ArchiveError::MarkerNotFound(DETAIL_DATA_MARKER.to_string())),
    }
}

/// Typed decode of the extracted tree; schema mismatches surface here.
pub fn decode_detail_data(value: Value) -> Result<DetailData> {
    Ok(serde_json::from_value(value)?)
}

/// Keywords and description from the page's `<meta>` tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub keywords: String,
    pub description: String,
}

impl PageMeta {
    pub fn from_document(doc: &Html) -> Self {
        let content = |sel: &Selector| {
            doc.select(sel)
                .next()
                .and_then(|e| e.value().attr("content"))
                .unwrap_or_default()
                .to_string()
        };

        Self {
            keywords: content(&KEYWORDS_SELECTOR),
            description: content(&DESCRIPTION_SELECTOR),
        }
    }
}
