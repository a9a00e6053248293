use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status code error: {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// No script carried the marker, or it had no assignment after it.
    #[error("no embedded data found for marker `{0}`")]
    MarkerNotFound(String),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl ArchiveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }
}
