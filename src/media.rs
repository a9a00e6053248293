//! Media download: pick the best variant of each item and fetch it on its own thread.

use reqwest::blocking::Client;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::error::{ArchiveError, Result};
use crate::models::MediaItem;

/// Video quality tiers, best first.
pub const VIDEO_TIERS: [&str; 5] = ["hd", "hd_265", "sd_265", "ld", "sd"];
/// Image size tiers, best first.
pub const IMAGE_TIERS: [&str; 4] = ["big", "normal", "small", "thumb"];

/// URL of the best available variant, or None when no known tier is present.
pub fn select_variant(item: &MediaItem) -> Option<&str> {
    match item {
        MediaItem::Video { video_url } => VIDEO_TIERS
            .iter()
            .find_map(|tier| video_url.get(*tier))
            .map(|v| v.video_url.as_str()),
        MediaItem::Image { image_url } => IMAGE_TIERS
            .iter()
            .find_map(|tier| image_url.get(*tier).and_then(|u| u.as_deref())),
        MediaItem::Other => None,
    }
}

/// Last path segment of `url` with query and fragment removed.
pub fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Make `name` unique within `taken` by appending `-1`, `-2`, ... before the extension.
fn disambiguate(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        })
        .find(|candidate| taken.insert(candidate.clone()))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct MediaDownloader {
    client: Client,
}

impl MediaDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Start one download per item into `dir`. Returns immediately; the
    /// downloads are observed through the returned batch.
    pub fn spawn(&self, items: &[MediaItem], dir: &Path) -> MediaBatch {
        let mut taken = HashSet::new();
        let mut tasks = Vec::new();

        for item in items {
            let Some(url) = select_variant(item) else {
                tracing::debug!("media item without a known variant, skipping");
                continue;
            };
            let name = file_name_from_url(url);
            if matches!(name.as_str(), "" | "." | "..") {
                tracing::warn!("cannot derive a file name from {url}, skipping");
                continue;
            }
            let name = disambiguate(&name, &mut taken);
            let target = dir.join(&name);
            let client = self.client.clone();
            let url = url.to_string();

            let handle = thread::spawn(move || download_file(&client, &url, &target));
            tasks.push(MediaTask { name, handle });
        }

        MediaBatch { tasks }
    }
}

struct MediaTask {
    name: String,
    handle: JoinHandle<Result<PathBuf>>,
}

/// Downloads started for one product.
pub struct MediaBatch {
    tasks: Vec<MediaTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSummary {
    pub saved: usize,
    pub failed: usize,
    /// Names of the files actually written, in item order.
    pub files: Vec<String>,
}

impl MediaSummary {
    pub fn merge(&mut self, other: MediaSummary) {
        self.saved += other.saved;
        self.failed += other.failed;
        self.files.extend(other.files);
    }
}

impl MediaBatch {
    /// File names the downloads will be written under, in item order.
    pub fn file_names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every download. Failures are logged, never returned.
    pub fn join(self) -> MediaSummary {
        let mut summary = MediaSummary::default();
        for task in self.tasks {
            match task.handle.join() {
                Ok(Ok(path)) => {
                    tracing::debug!("saved {}", path.display());
                    summary.saved += 1;
                    summary.files.push(task.name);
                }
                Ok(Err(e)) => {
                    tracing::warn!("media {} failed: {e}", task.name);
                    summary.failed += 1;
                }
                Err(_) => {
                    tracing::warn!("media {} download thread panicked", task.name);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

fn download_file(client: &Client, url: &str, target: &Path) -> Result<PathBuf> {
    let mut resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ArchiveError::Status {
            url: url.to_string(),
            status,
        });
    }

    let mut file = File::create(target).map_err(|e| ArchiveError::io(target, e))?;
    resp.copy_to(&mut file)?;
    Ok(target.to_path_buf())
}
