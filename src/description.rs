use lazy_static::lazy_static;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use scraper::node::Element;
use scraper::{Html, Node, Selector};
use serde::Deserialize;

use crate::config::ArchiverConfig;
use crate::error::{ArchiveError, Result};

lazy_static! {
    static ref IMG_SELECTOR: Selector = Selector::parse("img").unwrap();
}

#[derive(Debug, Deserialize)]
struct DescriptionEnvelope {
    data: DescriptionData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionData {
    product_html_description: String,
}

/// Fetches the product's long description, served separately from the page.
#[derive(Debug, Clone)]
pub struct DescriptionFetcher {
    client: Client,
    endpoint: String,
    language: String,
}

impl DescriptionFetcher {
    pub fn new(client: Client, config: &ArchiverConfig) -> Self {
        Self {
            client,
            endpoint: config.description_endpoint.clone(),
            language: config.description_language.clone(),
        }
    }

    /// Description HTML for `product_id`, with lazy-loaded images made visible.
    pub fn get_detail(&self, product_id: u64) -> Result<String> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("detailId", product_id.to_string()),
                ("language", self.language.clone()),
            ])
            .send()?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ArchiveError::Status {
                url: resp.url().to_string(),
                status,
            });
        }

        let body = resp.text()?;
        let envelope: DescriptionEnvelope = serde_json::from_str(&body)?;
        Ok(rewrite_lazy_images(&envelope.data.product_html_description))
    }
}

/// Point every `<img>` that carries `data-src` at that source. Images without
/// `data-src` keep their `src`. The fragment is parsed and re-serialized, so
/// markup comes back in normalized form.
pub fn rewrite_lazy_images(html: &str) -> String {
    let mut doc = Html::parse_fragment(html);
    let images: Vec<_> = doc.select(&IMG_SELECTOR).map(|img| img.id()).collect();
    for id in images {
        if let Some(mut node) = doc.tree.get_mut(id) {
            if let Node::Element(element) = node.value() {
                use_lazy_source(element);
            }
        }
    }
    doc.root_element().inner_html()
}

fn use_lazy_source(element: &mut Element) {
    let Some((lazy_name, lazy)) = element
        .attrs
        .iter()
        .find(|(name, _)| &*name.local == "data-src")
        .map(|(name, value)| (name.clone(), value.clone()))
    else {
        return;
    };

    match element
        .attrs
        .iter_mut()
        .find(|(name, _)| &*name.local == "src")
    {
        Some((_, value)) => *value = lazy,
        None => {
            let mut src = lazy_name;
            src.local = "src".into();
            element.attrs.push((src, lazy));
            // attribute lookups binary-search on the name
            element.attrs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        }
    }
}
