//! Loading of schema, metadata and configuration files.
//!
//! Metadata and schema documents are YAML; project-local configuration
//! overrides may be YAML or TOML. Everything document-shaped is converted into
//! `docmeta_core::DataValue` so that the validator never depends on a
//! particular YAML library.
//!
//! # Example
//!
//! ```rust
//! use docmeta_parser::parse_yaml;
//!
//! let yaml = r#"
//! sns_Subscribe:
//!   title: Subscribe an email address to a topic
//!   services:
//!     sns: {Subscribe}
//! "#;
//!
//! let doc = parse_yaml(yaml).expect("Failed to parse metadata");
//! assert!(doc.get("sns_Subscribe").is_some());
//! ```

mod reference;

pub use reference::*;

use docmeta_core::{DataValue, ValidationOverrides};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading files.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// A reference data file has an unexpected shape
    #[error("Invalid reference data in {file}: {message}")]
    InvalidReference { file: String, message: String },
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse a single YAML document into a `DataValue`.
///
/// An empty document parses as `DataValue::Null`.
pub fn parse_yaml(content: &str) -> Result<DataValue> {
    let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(content)?;
    Ok(from_yaml(value))
}

/// Parse every document of a multi-document YAML stream.
///
/// Schema files use this layout: the first document is the main schema and
/// each following document declares named includes.
///
/// ```rust
/// use docmeta_parser::parse_yaml_documents;
///
/// let docs = parse_yaml_documents("a: int()\n---\nperson:\n  name: str()\n").unwrap();
/// assert_eq!(docs.len(), 2);
/// ```
pub fn parse_yaml_documents(content: &str) -> Result<Vec<DataValue>> {
    let mut documents = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(content) {
        let value = serde_yaml_ng::Value::deserialize(document)?;
        documents.push(from_yaml(value));
    }
    Ok(documents)
}

/// Parse a TOML document into a `DataValue`.
pub fn parse_toml(content: &str) -> Result<DataValue> {
    let value: toml::Value =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(from_toml(value))
}

/// Detect the file format from a path based on its extension.
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a document from a file with automatic format detection.
pub fn parse_file(path: &Path) -> Result<DataValue> {
    let content = std::fs::read_to_string(path)?;

    match detect_format(path)? {
        FileFormat::Yaml => parse_yaml(&content),
        FileFormat::Toml => parse_toml(&content),
    }
}

/// Load project-local validation overrides from a YAML or TOML file.
pub fn load_overrides(path: &Path) -> Result<ValidationOverrides> {
    let content = std::fs::read_to_string(path)?;

    match detect_format(path)? {
        FileFormat::Yaml => Ok(serde_yaml_ng::from_str(&content)?),
        FileFormat::Toml => {
            toml::from_str(&content).map_err(|e| ParserError::TomlError(e.to_string()))
        }
    }
}

fn from_yaml(value: serde_yaml_ng::Value) -> DataValue {
    use serde_yaml_ng::Value;

    match value {
        Value::Null => DataValue::Null,
        Value::Bool(b) => DataValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Int(i)
            } else {
                DataValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => DataValue::String(s),
        Value::Sequence(items) => DataValue::List(items.into_iter().map(from_yaml).collect()),
        Value::Mapping(mapping) => DataValue::Map(
            mapping
                .into_iter()
                .map(|(k, v)| (from_yaml(k), from_yaml(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn from_toml(value: toml::Value) -> DataValue {
    use toml::Value;

    match value {
        Value::String(s) => DataValue::String(s),
        Value::Integer(i) => DataValue::Int(i),
        Value::Float(f) => DataValue::Float(f),
        Value::Boolean(b) => DataValue::Bool(b),
        Value::Datetime(dt) => DataValue::String(dt.to_string()),
        Value::Array(items) => DataValue::List(items.into_iter().map(from_toml).collect()),
        Value::Table(table) => DataValue::Map(
            table
                .into_iter()
                .map(|(k, v)| (DataValue::String(k), from_toml(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_yaml_scalars() {
        let doc = parse_yaml("a: 1\nb: 2.5\nc: true\nd: ~\ne: text\n").unwrap();

        assert_eq!(doc.get("a"), Some(&DataValue::Int(1)));
        assert_eq!(doc.get("b"), Some(&DataValue::Float(2.5)));
        assert_eq!(doc.get("c"), Some(&DataValue::Bool(true)));
        assert_eq!(doc.get("d"), Some(&DataValue::Null));
        assert_eq!(doc.get("e"), Some(&DataValue::string("text")));
    }

    #[test]
    fn test_parse_yaml_keeps_key_order() {
        let doc = parse_yaml("zeta: 1\nalpha: 2\n").unwrap();
        let keys: Vec<String> = doc
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.key_text())
            .collect();

        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_empty_yaml_is_null() {
        assert_eq!(parse_yaml("").unwrap(), DataValue::Null);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_yaml("key: [unclosed\n  other: value");
        assert!(matches!(result.unwrap_err(), ParserError::YamlError(_)));
    }

    #[test]
    fn test_parse_yaml_documents() {
        let docs = parse_yaml_documents(
            "person: include('person')\n---\nperson:\n  name: str()\n  age: int()\n",
        )
        .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs[0].get("person"),
            Some(&DataValue::string("include('person')"))
        );
        assert!(docs[1].get("person").unwrap().is_map());
    }

    #[test]
    fn test_parse_toml() {
        let doc = parse_toml("strict_titles = true\nallow_list = [\"x\"]\n").unwrap();

        assert_eq!(doc.get("strict_titles"), Some(&DataValue::Bool(true)));
        assert_eq!(
            doc.get("allow_list"),
            Some(&DataValue::List(vec![DataValue::string("x")]))
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_toml("name = \"test\"\n[[[invalid syntax\n");
        assert!(matches!(result.unwrap_err(), ParserError::TomlError(_)));
    }

    #[test]
    fn test_detect_format_yaml() {
        assert_eq!(
            detect_format(Path::new("validation.yaml")).unwrap(),
            FileFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("validation.yml")).unwrap(),
            FileFormat::Yaml
        );
    }

    #[test]
    fn test_detect_format_toml() {
        assert_eq!(
            detect_format(Path::new("validation.toml")).unwrap(),
            FileFormat::Toml
        );
    }

    #[test]
    fn test_detect_format_unsupported() {
        let result = detect_format(Path::new("validation.json"));
        assert!(matches!(
            result.unwrap_err(),
            ParserError::UnsupportedFormat(_)
        ));
    }

    #[test]
    fn test_detect_format_no_extension() {
        let result = detect_format(Path::new("validation"));
        assert!(matches!(result.unwrap_err(), ParserError::InvalidExtension));
    }

    #[test]
    fn test_load_overrides_yaml_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("validation.yaml");
        let toml = dir.path().join("validation.toml");
        std::fs::write(&yaml, "allow_list:\n  - AKIAEXAMPLEEXAMPLE00\n").unwrap();
        std::fs::write(&toml, "sample_files = [\"clip.mp3\"]\nstrict_titles = true\n").unwrap();

        let from_yaml = load_overrides(&yaml).unwrap();
        let from_toml = load_overrides(&toml).unwrap();

        assert_eq!(from_yaml.allow_list, vec!["AKIAEXAMPLEEXAMPLE00"]);
        assert_eq!(from_yaml.strict_titles, None);
        assert_eq!(from_toml.sample_files, vec!["clip.mp3"]);
        assert_eq!(from_toml.strict_titles, Some(true));
    }
}
