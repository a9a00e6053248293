use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::redirect;
use url::Url;

use crate::config::ArchiverConfig;
use crate::error::{ArchiveError, Result};

const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client shared by the page, description and media requests.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cookie: String,
}

impl Fetcher {
    pub fn new(config: &ArchiverConfig) -> Result<Self> {
        let custom_redirect_policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error("Too many redirects (>10)")
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(custom_redirect_policy)
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            cookie: config.cookie.clone(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET a product page and return its body. Any non-2xx status is an error.
    pub fn fetch_page(&self, url: &str) -> Result<String> {
        let mut req = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8");
        if !self.cookie.is_empty() {
            req = req.header(COOKIE, self.cookie.as_str());
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp.text()?)
    }
}

/// Turn a product link (or a bare product slug) into the URL that is fetched.
/// Query string and fragment are dropped; they only carry tracking data.
pub fn normalize_detail_url(raw: &str, detail_prefix: &str) -> Result<String> {
    let raw = raw.trim();
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(detail_prefix)?.join(raw)?,
        Err(e) => return Err(e.into()),
    };
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://www.alibaba.com/product-detail/";

    #[test]
    fn drops_tracking_query() {
        let url = normalize_detail_url(
            "https://www.alibaba.com/product-detail/paint-boy_1600155582218.html?spm=a2700.6b614124IsHIQE#top",
            PREFIX,
        )
        .unwrap();
        assert_eq!(
            url,
            "https://www.alibaba.com/product-detail/paint-boy_1600155582218.html"
        );
    }

    #[test]
    fn joins_bare_slug_to_prefix() {
        let url = normalize_detail_url("paint-boy_1600155582218.html", PREFIX).unwrap();
        assert_eq!(
            url,
            "https://www.alibaba.com/product-detail/paint-boy_1600155582218.html"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_detail_url("http://", PREFIX).is_err());
    }
}
