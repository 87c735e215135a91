use anyhow::{Context, Result};
use docmeta_core::ValidationConfig;
use docmeta_parser::load_overrides;
use docmeta_scanner::{ProfanitySource, ProjectScanner};
use std::path::Path;
use tracing::info;

use crate::output;

pub async fn execute(
    root: &Path,
    config_path: Option<&Path>,
    profanity_url: Option<String>,
    format: &str,
) -> Result<()> {
    info!("Scanning project: {}", root.display());

    let mut config = ValidationConfig::default();
    if let Some(path) = config_path {
        let overrides = load_overrides(path)
            .with_context(|| format!("Failed to load validation config: {}", path.display()))?;
        config = config.with_overrides(&overrides);
        if format != "json" {
            output::print_info(&format!("Loaded overrides from {}", path.display()));
        }
    }

    let source = match profanity_url {
        Some(url) => ProfanitySource::Remote(url),
        None => ProfanitySource::Pinned,
    };
    let scanner = ProjectScanner::load(config, &source).await;

    let errors = scanner
        .scan(root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    output::print_findings("PROJECT VALIDATION", &errors, format);

    if !errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
