//! Error types for project scans.
//!
//! Problems found in scanned files are `MetadataError` findings, not errors.
//! These types cover failures of the scan itself.

use thiserror::Error;

/// Failure of a project scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The remote word list could not be fetched
    #[error("Failed to fetch word list: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The word list is not a JSON array of strings
    #[error("Invalid word list: {0}")]
    WordList(#[from] serde_json::Error),
}

/// Result type for project scans.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Failure of a duplicate snippet-tag check.
#[derive(Debug, Error)]
pub enum SnippetError {
    /// Tags are reused across files and the check runs in strict mode
    #[error("Found {count} duplicate snippet tag(s)")]
    DuplicateTags {
        /// Number of duplicated tags
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_tags_message() {
        let error = SnippetError::DuplicateTags { count: 3 };
        assert_eq!(error.to_string(), "Found 3 duplicate snippet tag(s)");
    }

    #[test]
    fn test_scan_error_messages() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ScanError::from(io).to_string(), "File I/O error: gone");
    }
}
