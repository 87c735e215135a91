//! Error types for schema compilation and metadata validation.
//!
//! Data problems are never errors here: they are collected as strings or
//! `MetadataError`s. These types cover a broken schema or an unreadable
//! `.doc_gen` tree, which stop validation immediately.

use docmeta_core::DataPath;
use docmeta_parser::ParserError;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed schema expression or constraint option.
///
/// When raised while compiling a schema tree, `path` holds the location of
/// the offending node so it can be reported without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", location(.path))]
pub struct SyntaxError {
    /// What went wrong
    pub message: String,
    /// Schema node that failed to compile
    pub path: Option<DataPath>,
}

impl SyntaxError {
    /// Creates an error without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Returns the same error located at `path`.
    pub fn at(self, path: &DataPath) -> Self {
        Self {
            message: self.message,
            path: Some(path.clone()),
        }
    }
}

fn location(path: &Option<DataPath>) -> String {
    path.as_ref()
        .map(|path| format!("\nPath: {}", path))
        .unwrap_or_default()
}

/// Result type for schema compilation.
pub type SyntaxResult<T> = std::result::Result<T, SyntaxError>;

/// Errors that stop a metadata validation run.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A schema, reference or metadata file could not be loaded
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// A schema file failed to compile
    #[error("Invalid schema {}: {source}", .file.display())]
    Schema {
        /// Schema file
        file: PathBuf,
        /// Compilation error
        source: SyntaxError,
    },

    /// A metadata file has no schema to validate against
    #[error("No schema found for {}", .0.display())]
    MissingSchema(PathBuf),

    /// Directory listing failed
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for metadata validation runs.
pub type Result<T> = std::result::Result<T, ValidatorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_syntax_error_keeps_path_separately() {
        let path = DataPath::new("languages").join("Python");
        let error = SyntaxError::new("Invalid schema expression: 'strr()'").at(&path);

        assert_eq!(error.path.as_ref(), Some(&path));
        assert_eq!(
            error.to_string(),
            "Invalid schema expression: 'strr()'\nPath: languages.Python"
        );
    }

    #[test]
    fn test_syntax_error_without_path() {
        let error = SyntaxError::new("min is not a int");

        assert_eq!(error.to_string(), "min is not a int");
        let source: &dyn std::error::Error = &error;
        assert!(source.source().is_none());
    }
}
