use anyhow::{Context, Result};
use docmeta_core::ValidationConfig;
use docmeta_parser::load_overrides;
use docmeta_validator::MetadataValidator;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(
    doc_gen: &Path,
    config_path: Option<&Path>,
    strict_titles: bool,
    format: &str,
) -> Result<()> {
    info!("Validating metadata in: {}", doc_gen.display());

    let mut config = ValidationConfig::default();
    if let Some(path) = config_path {
        let overrides = load_overrides(path)
            .with_context(|| format!("Failed to load validation config: {}", path.display()))?;
        config = config.with_overrides(&overrides);
        if format != "json" {
            output::print_info(&format!("Loaded overrides from {}", path.display()));
        }
    }
    if strict_titles {
        config.strict_titles = true;
    }

    let validator = MetadataValidator::new(doc_gen)
        .with_context(|| format!("Failed to load reference data from {}", doc_gen.display()))?
        .with_config(&config);

    let errors = validator
        .validate_all()
        .with_context(|| format!("Failed to validate metadata in {}", doc_gen.display()))?;

    output::print_findings("METADATA VALIDATION", &errors, format);

    if !errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
