//! Verification of the shared sample files folder.

use crate::Result;
use crate::files::relative;
use docmeta_core::{MetadataError, MetadataErrors, ValidationConfig};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Location of sample files, relative to the project root.
pub const SAMPLE_FILES_DIR: &str = "resources/sample_files";

/// Folder media files must live under.
pub const SAMPLE_MEDIA_DIR: &str = ".sample_media";

/// Largest allowed sample file, in bytes.
pub const MAX_SAMPLE_FILE_BYTES: u64 = 10_000_000;

/// Extensions of media files.
pub const MEDIA_EXTENSIONS: &[&str] = &["jpeg", "jpg", "mp3", "mp4", "png", "wav"];

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Checks the files under `root/resources/sample_files` against
/// `config.sample_files`. Does nothing when the folder does not exist.
///
/// Returns the number of new errors added.
pub fn verify_sample_files(
    root: &Path,
    config: &ValidationConfig,
    errors: &mut MetadataErrors,
) -> Result<usize> {
    let sample_dir = root.join(SAMPLE_FILES_DIR);
    if !sample_dir.is_dir() {
        return Ok(0);
    }

    let mut found = Vec::new();
    let mut present = BTreeSet::new();
    for entry in WalkDir::new(&sample_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file = relative(root, path);
        let name = entry.file_name().to_string_lossy().into_owned();

        if !config.sample_files.contains(&name) {
            found.push(MetadataError::UnknownSampleFile { file: file.clone() });
        }
        let in_media_dir = path
            .strip_prefix(&sample_dir)
            .unwrap_or(path)
            .components()
            .any(|c| c.as_os_str() == SAMPLE_MEDIA_DIR);
        if is_media(path) && !in_media_dir {
            found.push(MetadataError::InvalidSampleDirectory { file: file.clone() });
        }
        let size_bytes = entry.metadata()?.len();
        if size_bytes > MAX_SAMPLE_FILE_BYTES {
            found.push(MetadataError::SampleFileTooLarge { file, size_bytes });
        }
        present.insert(name);
    }

    let folder = relative(root, &sample_dir);
    for expected in config.sample_files.difference(&present) {
        found.push(MetadataError::MissingSampleFile {
            file: folder.clone(),
            sample_file: expected.clone(),
        });
    }

    debug!(files = present.len(), findings = found.len(), "Verified sample files");
    Ok(errors.merge(found))
}
