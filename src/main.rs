use std::fs;
use std::path::Path;

use alibaba_product_archiver::{Archiver, config, logging};
use anyhow::{Context, Result};

fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("logging disabled: {e:#}");
    }

    let cfg = config::load(Path::new(config::CONFIG_FILE))?;
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    let mut archiver = Archiver::new(cfg)?;
    let urls = archiver.config().urls.clone();
    let summary = archiver.run(&urls);

    println!(
        "Archived {} product(s), skipped {}; media saved {}, failed {}.",
        summary.archived, summary.skipped, summary.media.saved, summary.media.failed
    );
    Ok(())
}
