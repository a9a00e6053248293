use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use scraper::Html;

use crate::config::ArchiverConfig;
use crate::description::DescriptionFetcher;
use crate::error::{ArchiveError, Result};
use crate::fetcher::{Fetcher, normalize_detail_url};
use crate::media::{MediaBatch, MediaDownloader, MediaSummary};
use crate::models::ArchiveRecord;
use crate::parser::{self, EmbeddedDataSource, PageMeta, ScriptAssignmentExtractor};
use crate::report;

/// What `archive_url` produced for one product.
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub product_id: u64,
    pub dir: PathBuf,
    pub description_saved: bool,
    /// File names the media downloads were started under.
    pub media: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub archived: usize,
    pub skipped: usize,
    pub media: MediaSummary,
}

/// Downloads of one product, and the record to write once they finish.
struct PendingMedia {
    batch: MediaBatch,
    record: ArchiveRecord,
    record_path: PathBuf,
}

/// Runs the fetch, extract and persist pipeline over product pages.
pub struct Archiver {
    config: ArchiverConfig,
    fetcher: Fetcher,
    extractor: Box<dyn EmbeddedDataSource>,
    description: DescriptionFetcher,
    downloader: MediaDownloader,
    pending: Vec<PendingMedia>,
}

impl Archiver {
    pub fn new(config: ArchiverConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let description = DescriptionFetcher::new(fetcher.client().clone(), &config);
        let downloader = MediaDownloader::new(fetcher.client().clone());
        Ok(Self {
            config,
            fetcher,
            extractor: Box::new(ScriptAssignmentExtractor),
            description,
            downloader,
            pending: Vec::new(),
        })
    }

    /// Replace the strategy used to pull the embedded document from a page.
    pub fn with_extractor(mut self, extractor: impl EmbeddedDataSource + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn config(&self) -> &ArchiverConfig {
        &self.config
    }

    /// Archive one product page. Media downloads are started but not awaited;
    /// `<id>.json` is written by `wait_for_media` once they finish.
    pub fn archive_url(&mut self, raw_url: &str) -> Result<ArchiveOutcome> {
        let url = normalize_detail_url(raw_url, &self.config.detail_prefix)?;
        tracing::info!("{url} >>> fetching");

        let html = self.fetcher.fetch_page(&url)?;
        let (value, meta) = {
            let doc = Html::parse_document(&html);
            (self.extractor.extract(&doc)?, PageMeta::from_document(&doc))
        };
        let data = parser::decode_detail_data(value)?;
        let product = &data.global_data.product;
        let product_id = product.product_id;

        let dir = self.config.output_dir.join(product_id.to_string());
        fs::create_dir_all(&dir).map_err(|e| ArchiveError::io(&dir, e))?;

        let batch = self.downloader.spawn(&product.media_items, &dir);
        let media = batch.file_names();
        tracing::debug!("{} media downloads started for {product_id}", batch.len());
        self.pending.push(PendingMedia {
            batch,
            record: ArchiveRecord {
                product_id,
                title: product.subject.clone(),
                source_url: url.clone(),
                media: Vec::new(),
                archived_at: chrono::Utc::now().to_rfc3339(),
            },
            record_path: dir.join(format!("{product_id}.json")),
        });

        let report = report::render_report(product, &data.global_data.trade, &meta);
        write_file(&dir.join(format!("{product_id}.txt")), &report)?;

        let description_saved = match self.description.get_detail(product_id) {
            Ok(detail) => {
                write_file(&dir.join(format!("{product_id}.html")), &detail)?;
                true
            }
            Err(e) => {
                tracing::warn!("description for {product_id} not saved: {e}");
                false
            }
        };

        tracing::info!("{url} >>> done");
        Ok(ArchiveOutcome {
            product_id,
            dir,
            description_saved,
            media,
        })
    }

    /// Block until every media download started so far has finished, then
    /// write each product's record listing the files that were saved.
    pub fn wait_for_media(&mut self) -> MediaSummary {
        let mut summary = MediaSummary::default();
        for pending in self.pending.drain(..) {
            let saved = pending.batch.join();
            let mut record = pending.record;
            record.media = saved.files.clone();
            if let Err(e) = write_record(&pending.record_path, &record) {
                tracing::error!("record for {} not saved: {e}", record.product_id);
            }
            summary.merge(saved);
        }
        summary
    }

    /// Archive each URL in order. A failing URL is logged and skipped; the
    /// courtesy delay separates consecutive URLs.
    pub fn run<S: AsRef<str>>(&mut self, urls: &[S]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.config.courtesy_delay().is_zero() {
                thread::sleep(self.config.courtesy_delay());
            }
            match self.archive_url(url.as_ref()) {
                Ok(outcome) => {
                    tracing::debug!("archived {} into {}", outcome.product_id, outcome.dir.display());
                    summary.archived += 1;
                }
                Err(e) => {
                    tracing::error!("skipping {}: {e}", url.as_ref());
                    summary.skipped += 1;
                }
            }
        }

        summary.media = self.wait_for_media();
        summary
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| ArchiveError::io(path, e))
}

fn write_record(path: &Path, record: &ArchiveRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    write_file(path, &json)
}
