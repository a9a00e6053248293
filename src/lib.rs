pub mod archiver;
pub mod config;
pub mod description;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod media;
pub mod models;
pub mod parser;
pub mod report;

pub use archiver::{ArchiveOutcome, Archiver, RunSummary};
pub use config::ArchiverConfig;
pub use error::{ArchiveError, Result};
