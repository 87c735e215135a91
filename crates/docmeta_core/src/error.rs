//! Error types for metadata and project validation.
//!
//! Every finding is a `MetadataError` carrying the file it was found in plus
//! the fields needed to render a precise message. Findings are collected in a
//! `MetadataErrors`, which keeps at most one copy of each.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single validation finding.
///
/// Two errors are the same finding when their kind and all of their fields
/// are equal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataError {
    /// The file could not be read as text
    #[error("{}: could not be read as UTF-8 text", .file.display())]
    FileRead {
        /// File that failed to read
        file: PathBuf,
    },

    /// A word from the deny list appears in the file
    #[error("{} contains a word from the deny list: {word}", .file.display())]
    DenyListWord {
        /// File containing the word
        file: PathBuf,
        /// Offending token as it appears in the file
        word: String,
    },

    /// A string shaped like an access key or secret key appears in the file
    #[error("{} contains {word} that might be a secret key", .file.display())]
    PossibleSecretKey {
        /// File containing the candidate
        file: PathBuf,
        /// Candidate secret
        word: String,
    },

    /// Source file has no copyright line in its header
    #[error("{}: missing copyright line in file header", .file.display())]
    MissingCopyright {
        /// Source file
        file: PathBuf,
    },

    /// Source file has no SPDX license identifier in its header
    #[error("{}: missing SPDX-License-Identifier in file header", .file.display())]
    MissingSpdxHeader {
        /// Source file
        file: PathBuf,
    },

    /// A snippet-start tag has no matching snippet-end tag
    #[error("{}: snippet-start:[{tag}] has no matching snippet-end", .file.display())]
    UnmatchedSnippetStart {
        /// Source file
        file: PathBuf,
        /// Snippet tag
        tag: String,
    },

    /// A snippet-end tag has no matching snippet-start tag
    #[error("{}: snippet-end:[{tag}] has no matching snippet-start", .file.display())]
    UnmatchedSnippetEnd {
        /// Source file
        file: PathBuf,
        /// Snippet tag
        tag: String,
    },

    /// A file in the sample files folder is not in the expected set
    #[error("{}: unknown sample file, add it to the sample_files list", .file.display())]
    UnknownSampleFile {
        /// Unexpected sample file
        file: PathBuf,
    },

    /// A media sample file is outside the `.sample_media` folder
    #[error("{}: media sample files must be placed under .sample_media", .file.display())]
    InvalidSampleDirectory {
        /// Misplaced media file
        file: PathBuf,
    },

    /// A sample file exceeds the size limit
    #[error("{}: sample file is {:.2} MB, the limit is 10 MB", .file.display(), megabytes(.size_bytes))]
    SampleFileTooLarge {
        /// Oversized file
        file: PathBuf,
        /// File size in bytes
        size_bytes: u64,
    },

    /// An expected sample file is missing
    #[error("{}: expected sample file {sample_file} is missing", .file.display())]
    MissingSampleFile {
        /// Sample files folder
        file: PathBuf,
        /// Expected file name
        sample_file: String,
    },

    /// A metadata document could not be parsed
    #[error("{}: failed to parse YAML: {message}", .file.display())]
    YamlParse {
        /// Metadata file
        file: PathBuf,
        /// Parser message
        message: String,
    },

    /// A metadata document does not match its schema
    #[error("{}: {message}", .file.display())]
    SchemaViolation {
        /// Metadata file
        file: PathBuf,
        /// Path-qualified schema error
        message: String,
    },

    /// An example is missing a required field
    #[error("{}: example {id} is missing field {field}", .file.display())]
    MissingField {
        /// Metadata file
        file: PathBuf,
        /// Example id
        id: String,
        /// Missing field name
        field: String,
    },

    /// An example lists a language that is not a known SDK
    #[error("{}: example {id} uses unknown language {language}", .file.display())]
    UnknownLanguage {
        /// Metadata file
        file: PathBuf,
        /// Example id
        id: String,
        /// Language key
        language: String,
    },

    /// An SDK guide link does not point at the documentation site
    #[error("{}: example {id} has sdkguide {guide} that does not start with https://docs.aws.amazon.com/", .file.display())]
    InvalidSdkGuideStart {
        /// Metadata file
        file: PathBuf,
        /// Example id
        id: String,
        /// Guide link
        guide: String,
    },

    /// An example title breaks title casing or punctuation rules
    #[error("{}: example {id} has title '{title}' that must start upper case and not end with a period", .file.display())]
    InvalidTitle {
        /// Metadata file
        file: PathBuf,
        /// Example id
        id: String,
        /// Offending title
        title: String,
    },

    /// An example id is declared in more than one place
    #[error("{}: example {id} is also declared in {}", .file.display(), .other_file.display())]
    DuplicateExampleId {
        /// Metadata file
        file: PathBuf,
        /// Example id
        id: String,
        /// File holding the first declaration
        other_file: PathBuf,
    },
}

impl MetadataError {
    /// The file this error was found in.
    pub fn file(&self) -> &Path {
        match self {
            MetadataError::FileRead { file }
            | MetadataError::DenyListWord { file, .. }
            | MetadataError::PossibleSecretKey { file, .. }
            | MetadataError::MissingCopyright { file }
            | MetadataError::MissingSpdxHeader { file }
            | MetadataError::UnmatchedSnippetStart { file, .. }
            | MetadataError::UnmatchedSnippetEnd { file, .. }
            | MetadataError::UnknownSampleFile { file }
            | MetadataError::InvalidSampleDirectory { file }
            | MetadataError::SampleFileTooLarge { file, .. }
            | MetadataError::MissingSampleFile { file, .. }
            | MetadataError::YamlParse { file, .. }
            | MetadataError::SchemaViolation { file, .. }
            | MetadataError::MissingField { file, .. }
            | MetadataError::UnknownLanguage { file, .. }
            | MetadataError::InvalidSdkGuideStart { file, .. }
            | MetadataError::InvalidTitle { file, .. }
            | MetadataError::DuplicateExampleId { file, .. } => file,
        }
    }

    /// The human-readable message for this error.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1_000_000.0
}

/// Returned by `MetadataErrors::add` when the same finding was already recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("already recorded: {0}")]
pub struct AlreadyPresent(pub MetadataError);

/// An ordered, append-only collection holding at most one copy of each error.
#[derive(Debug, Default, Clone)]
pub struct MetadataErrors {
    errors: Vec<MetadataError>,
    seen: HashSet<MetadataError>,
}

impl MetadataErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error unless an identical one is already present.
    pub fn add(&mut self, error: MetadataError) -> Result<(), AlreadyPresent> {
        if self.seen.contains(&error) {
            return Err(AlreadyPresent(error));
        }
        self.seen.insert(error.clone());
        self.errors.push(error);
        Ok(())
    }

    /// Appends every error, skipping duplicates. Returns how many were new.
    pub fn merge(&mut self, errors: impl IntoIterator<Item = MetadataError>) -> usize {
        errors
            .into_iter()
            .filter(|error| self.add(error.clone()).is_ok())
            .count()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataError> {
        self.errors.iter()
    }

    /// Consumes the collection, returning errors in insertion order.
    pub fn into_vec(self) -> Vec<MetadataError> {
        self.errors
    }
}

impl<'a> IntoIterator for &'a MetadataErrors {
    type Item = &'a MetadataError;
    type IntoIter = std::slice::Iter<'a, MetadataError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for MetadataErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deny(word: &str) -> MetadataError {
        MetadataError::DenyListWord {
            file: PathBuf::from("a.py"),
            word: word.to_string(),
        }
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut errors = MetadataErrors::new();

        assert!(errors.add(deny("bad")).is_ok());
        assert_eq!(errors.add(deny("bad")), Err(AlreadyPresent(deny("bad"))));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_same_kind_different_fields_are_distinct() {
        let mut errors = MetadataErrors::new();

        errors.add(deny("one")).unwrap();
        errors.add(deny("two")).unwrap();
        errors
            .add(MetadataError::PossibleSecretKey {
                file: PathBuf::from("a.py"),
                word: "one".to_string(),
            })
            .unwrap();

        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_merge_counts_new_errors() {
        let mut errors = MetadataErrors::new();
        errors.add(deny("one")).unwrap();

        let added = errors.merge(vec![deny("one"), deny("two"), deny("two")]);

        assert_eq!(added, 1);
        assert_eq!(
            errors.iter().cloned().collect::<Vec<_>>(),
            vec![deny("one"), deny("two")]
        );
    }

    #[test]
    fn test_sample_size_message_uses_decimal_megabytes() {
        let error = MetadataError::SampleFileTooLarge {
            file: PathBuf::from("big.bin"),
            size_bytes: 12_500_000,
        };

        assert_eq!(
            error.message(),
            "big.bin: sample file is 12.50 MB, the limit is 10 MB"
        );
        assert_eq!(error.file(), Path::new("big.bin"));
    }
}
