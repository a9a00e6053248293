use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ArchiveError, Result};

/// Config file looked up in the working directory by the binary.
pub const CONFIG_FILE: &str = "archiver.toml";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Archiver settings. Every field has a default, so a partial (or absent)
/// `archiver.toml` is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiverConfig {
    /// Top-level output directory; each product gets a subdirectory named by id.
    pub output_dir: PathBuf,
    /// Product pages to archive, processed in order.
    pub urls: Vec<String>,
    /// Timeout applied to every HTTP request (page, description, media).
    pub request_timeout_secs: u64,
    /// Pause between two consecutive product pages.
    pub courtesy_delay_secs: u64,
    /// Cookie header for the page request. Omitted when empty.
    pub cookie: String,
    pub user_agent: String,
    /// Prefix joined to bare product slugs.
    pub detail_prefix: String,
    /// Endpoint serving the `productHtmlDescription` envelope.
    pub description_endpoint: String,
    pub description_language: String,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("alibaba"),
            urls: vec![
                "https://www.alibaba.com/product-detail/paint-boy-newest-wholesale-5d-diamond_1600155582218.html?spm=a2700.galleryofferlist.wending_right.6.6b614124IsHIQE".to_string(),
            ],
            request_timeout_secs: 30,
            courtesy_delay_secs: 10,
            cookie: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            detail_prefix: "https://www.alibaba.com/product-detail/".to_string(),
            description_endpoint: "https://www.alibaba.com/event/app/mainAction/desc.htm"
                .to_string(),
            description_language: "en".to_string(),
        }
    }
}

impl ArchiverConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_secs(self.courtesy_delay_secs)
    }
}

/// Load configuration from `path`, falling back to defaults when the file does not exist.
pub fn load(path: &Path) -> Result<ArchiverConfig> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(ArchiverConfig::default());
    }

    let data = fs::read_to_string(path).map_err(|e| ArchiveError::io(path, e))?;
    let cfg: ArchiverConfig = toml::from_str(&data)?;
    tracing::info!("loaded config from {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ArchiverConfig::default();
        assert_eq!(cfg.output_dir, PathBuf::from("alibaba"));
        assert_eq!(cfg.urls.len(), 1);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.courtesy_delay(), Duration::from_secs(10));
        assert!(cfg.cookie.is_empty());
        assert_eq!(cfg.description_language, "en");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
            output_dir = "out"
            courtesy_delay_secs = 0
            urls = ["https://www.alibaba.com/product-detail/a_1.html"]
        "#;
        let cfg: ArchiverConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.courtesy_delay_secs, 0);
        assert_eq!(cfg.urls, vec!["https://www.alibaba.com/product-detail/a_1.html"]);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.detail_prefix, "https://www.alibaba.com/product-detail/");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
    }
}
