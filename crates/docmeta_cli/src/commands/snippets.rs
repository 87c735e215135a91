use anyhow::{Context, Result};
use docmeta_scanner::DuplicateDetector;
use std::path::Path;
use tracing::info;

use crate::output;

pub async fn execute(root: &Path, workers: usize, strict: bool, format: &str) -> Result<()> {
    info!("Checking snippet tags in: {}", root.display());

    let index = DuplicateDetector::new()
        .with_workers(workers)
        .scan(root)
        .await
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    let report = index.duplicates();

    output::print_duplicate_report(&report, index.files_scanned(), format);

    if report.check(strict)? && format != "json" {
        output::print_success("Every snippet tag is used in a single file");
    }

    Ok(())
}
