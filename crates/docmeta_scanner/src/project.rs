//! Content-policy scan of a project tree.

use crate::files::{read_text, relative, scan_files};
use crate::{DenyList, ProfanitySource, Result, sample_files, secrets, snippets, spdx};
use docmeta_core::{MetadataError, MetadataErrors, ValidationConfig};
use std::path::Path;
use tracing::{debug, info};

/// Runs every per-file content check over the files under `root`.
///
/// A file that cannot be read as text becomes a `FileRead` finding and the
/// scan moves on. Findings name files relative to `root`.
///
/// Returns the number of files checked.
pub fn check_files(
    root: &Path,
    config: &ValidationConfig,
    deny_list: &DenyList,
    errors: &mut MetadataErrors,
) -> Result<usize> {
    let files = scan_files(root)?;
    let mut checked = 0usize;

    for path in &files {
        let file = relative(root, path);
        let Some(content) = read_text(path) else {
            debug!(file = %file.display(), "Unreadable file");
            let _ = errors.add(MetadataError::FileRead { file });
            continue;
        };

        let found = deny_list.check(&file, &content, errors)
            + secrets::check(&file, &content, config, errors)
            + spdx::check(&file, &content, errors)
            + snippets::check(&file, &content, errors);
        debug!(file = %file.display(), errors = found, "Checked file");
        checked += 1;
    }

    info!(files = checked, errors = errors.len(), "Project file checks complete");
    Ok(checked)
}

/// Scans a project for content-policy problems.
///
/// # Example
///
/// ```rust,no_run
/// use docmeta_core::ValidationConfig;
/// use docmeta_scanner::{ProfanitySource, ProjectScanner};
/// use std::path::Path;
///
/// # async fn run() -> docmeta_scanner::Result<()> {
/// let scanner = ProjectScanner::load(ValidationConfig::default(), &ProfanitySource::Pinned).await;
/// let errors = scanner.scan(Path::new("."))?;
///
/// for error in &errors {
///     println!("{}", error);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProjectScanner {
    config: ValidationConfig,
    deny_list: DenyList,
}

impl ProjectScanner {
    /// Creates a scanner with an already loaded deny list.
    pub fn new(config: ValidationConfig, deny_list: DenyList) -> Self {
        Self { config, deny_list }
    }

    /// Creates a scanner, loading the deny list from `source`.
    pub async fn load(config: ValidationConfig, source: &ProfanitySource) -> Self {
        let deny_list = DenyList::load(source).await;
        info!(words = deny_list.len(), "Loaded deny list");
        Self::new(config, deny_list)
    }

    /// The configuration this scanner checks against.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Runs the per-file checks and the sample file verification.
    pub fn scan(&self, root: &Path) -> Result<MetadataErrors> {
        let mut errors = MetadataErrors::new();
        check_files(root, &self.config, &self.deny_list, &mut errors)?;
        sample_files::verify_sample_files(root, &self.config, &mut errors)?;
        Ok(errors)
    }
}
