//! Metadata validation for a `.doc_gen` folder.
//!
//! The folder holds `metadata/` (the documents to check, plus the reference
//! files `services.yaml` and `sdks.yaml`), `schema/` (one YAML schema per
//! kind of document) and optionally `cross-content/`.

use crate::{ExampleChecks, Result, Schema, SyntaxError, ValidatorError, ValidatorRegistry};
use docmeta_core::{DataValue, MetadataError, MetadataErrors, ReferenceData, ValidationConfig};
use docmeta_parser::{load_reference_data, parse_file, parse_yaml_documents, ParserError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Suffix of example metadata files.
pub const METADATA_SUFFIX: &str = "_metadata.yaml";

/// Schema used for example metadata files without a dedicated schema.
pub const EXAMPLE_SCHEMA: &str = "example_schema.yaml";

/// Validates every document under a `.doc_gen` folder.
///
/// # Example
///
/// ```rust,no_run
/// use docmeta_validator::MetadataValidator;
/// use std::path::Path;
///
/// let validator = MetadataValidator::new(Path::new(".doc_gen")).unwrap();
/// let errors = validator.validate_all().unwrap();
///
/// for error in &errors {
///     println!("{}", error);
/// }
/// ```
#[derive(Debug)]
pub struct MetadataValidator {
    doc_gen: PathBuf,
    reference: Arc<ReferenceData>,
    validators: Arc<ValidatorRegistry>,
    strict: bool,
    strict_titles: bool,
}

impl MetadataValidator {
    /// Creates a validator, loading reference data from `doc_gen`.
    pub fn new(doc_gen: &Path) -> Result<Self> {
        let reference = load_reference_data(doc_gen)?;
        info!(
            services = reference.services.len(),
            sdks = reference.sdks.len(),
            block_content = reference.block_content.len(),
            "Loaded reference data"
        );
        Ok(Self::with_reference(doc_gen, reference))
    }

    /// Creates a validator with reference data supplied by the caller.
    pub fn with_reference(doc_gen: &Path, reference: ReferenceData) -> Self {
        let reference = Arc::new(reference);
        Self {
            doc_gen: doc_gen.to_path_buf(),
            validators: Arc::new(ValidatorRegistry::metadata_validators(reference.clone())),
            reference,
            strict: true,
            strict_titles: false,
        }
    }

    /// Reports keys not declared by the schema. On by default.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enables the title style check on examples.
    pub fn with_strict_titles(mut self, strict_titles: bool) -> Self {
        self.strict_titles = strict_titles;
        self
    }

    /// Applies the metadata settings of a project configuration.
    pub fn with_config(self, config: &ValidationConfig) -> Self {
        self.with_strict_titles(config.strict_titles)
    }

    /// The validator table schemas compile against.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Compiles a schema file.
    ///
    /// The first YAML document is the main schema; every following document
    /// registers named includes.
    pub fn load_schema(&self, path: &Path) -> Result<Schema> {
        let content = std::fs::read_to_string(path)?;
        let documents = parse_yaml_documents(&content)?;
        let schema_error = |source: SyntaxError| ValidatorError::Schema {
            file: path.to_path_buf(),
            source,
        };

        let (main, includes) = match documents.split_first() {
            Some((main, includes)) => (main.clone(), includes),
            None => (DataValue::Null, &[][..]),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let schema =
            Schema::new(&main, name, self.validators.clone(), None).map_err(schema_error)?;
        for types in includes {
            schema.add_include(types).map_err(schema_error)?;
        }

        info!(
            schema = %path.display(),
            includes = schema.includes().len(),
            "Compiled schema"
        );
        Ok(schema)
    }

    /// Schema for a metadata document, if any.
    ///
    /// `schema/<stem>_schema.yaml` wins; example metadata files fall back to
    /// `schema/example_schema.yaml`.
    pub fn schema_for(&self, document: &Path) -> Option<PathBuf> {
        let schema_dir = self.doc_gen.join("schema");
        let file_name = document.file_name()?.to_string_lossy();
        let stem = document.file_stem()?.to_string_lossy();

        let dedicated = schema_dir.join(format!("{}_schema.yaml", stem));
        if dedicated.is_file() {
            return Some(dedicated);
        }
        if file_name.ends_with(METADATA_SUFFIX) {
            return Some(schema_dir.join(EXAMPLE_SCHEMA));
        }
        None
    }

    /// YAML documents in `metadata/`, sorted by name.
    pub fn metadata_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(self.doc_gen.join("metadata"))? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if path.is_file() && is_yaml {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Validates every metadata document, collecting all findings.
    ///
    /// Unparseable documents and schema mismatches are findings. A schema
    /// that fails to compile or is missing stops the run.
    pub fn validate_all(&self) -> Result<MetadataErrors> {
        let mut errors = MetadataErrors::new();
        let mut schemas: HashMap<PathBuf, Schema> = HashMap::new();
        let mut examples = ExampleChecks::new(self.reference.clone(), self.strict_titles);
        let mut validated = 0usize;

        for file in self.metadata_files()? {
            let Some(schema_path) = self.schema_for(&file) else {
                debug!(file = %file.display(), "No schema, skipping");
                continue;
            };
            if !schema_path.is_file() {
                return Err(ValidatorError::MissingSchema(file));
            }

            let document = match parse_file(&file) {
                Ok(document) => document,
                Err(ParserError::YamlError(e)) => {
                    let _ = errors.add(MetadataError::YamlParse {
                        file: file.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !schemas.contains_key(&schema_path) {
                let schema = self.load_schema(&schema_path)?;
                schemas.insert(schema_path.clone(), schema);
            }
            let Some(schema) = schemas.get(&schema_path) else {
                continue;
            };

            let data_name = file.display().to_string();
            let result = schema.validate(&document, &data_name, self.strict);
            debug!(
                file = %file.display(),
                schema = schema.name(),
                errors = result.errors.len(),
                "Validated document"
            );
            errors.merge(result.errors.into_iter().map(|message| {
                MetadataError::SchemaViolation {
                    file: file.clone(),
                    message,
                }
            }));

            if is_example_metadata(&file) {
                examples.check(&file, &document, &mut errors);
            }
            validated += 1;
        }

        info!(
            documents = validated,
            errors = errors.len(),
            "Metadata validation complete"
        );
        Ok(errors)
    }
}

fn is_example_metadata(file: &Path) -> bool {
    file.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(METADATA_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmeta_core::ReferenceDataBuilder;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn doc_gen() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("metadata")).unwrap();
        fs::create_dir_all(dir.path().join("schema")).unwrap();
        dir
    }

    fn validator(dir: &Path) -> MetadataValidator {
        let reference = ReferenceDataBuilder::new()
            .service("sns")
            .sdk("Python", ["3"])
            .build();
        MetadataValidator::with_reference(dir, reference)
    }

    #[test]
    fn test_schema_for_prefers_dedicated_schema() {
        let dir = doc_gen();
        fs::write(dir.path().join("schema/sdks_schema.yaml"), "{}").unwrap();
        let validator = validator(dir.path());

        assert_eq!(
            validator.schema_for(&dir.path().join("metadata/sdks.yaml")),
            Some(dir.path().join("schema/sdks_schema.yaml"))
        );
        assert_eq!(
            validator.schema_for(&dir.path().join("metadata/sns_metadata.yaml")),
            Some(dir.path().join("schema/example_schema.yaml"))
        );
        assert_eq!(
            validator.schema_for(&dir.path().join("metadata/services.yaml")),
            None
        );
    }

    #[test]
    fn test_load_schema_with_includes() {
        let dir = doc_gen();
        let path = dir.path().join("schema/example_schema.yaml");
        fs::write(
            &path,
            "map(include('example'), key=example_id())\n---\nexample:\n  title: str()\n",
        )
        .unwrap();

        let schema = validator(dir.path()).load_schema(&path).unwrap();

        assert_eq!(schema.name(), "example_schema.yaml");
        assert_eq!(schema.includes().names(), vec!["example"]);
    }

    #[test]
    fn test_load_schema_reports_file() {
        let dir = doc_gen();
        let path = dir.path().join("schema/broken_schema.yaml");
        fs::write(&path, "title: strr()\n").unwrap();

        let error = validator(dir.path()).load_schema(&path).unwrap_err();

        match error {
            ValidatorError::Schema { file, source } => {
                assert_eq!(file, path);
                assert_eq!(source.path.map(|p| p.to_string()), Some("title".to_string()));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_example_schema() {
        let dir = doc_gen();
        fs::write(dir.path().join("metadata/sns_metadata.yaml"), "{}").unwrap();

        let result = validator(dir.path()).validate_all();

        assert!(matches!(result, Err(ValidatorError::MissingSchema(_))));
    }

    #[test]
    fn test_config_enables_title_checks() {
        let dir = doc_gen();
        fs::write(dir.path().join("schema/example_schema.yaml"), "any()\n").unwrap();
        fs::write(
            dir.path().join("metadata/sns_metadata.yaml"),
            "sns_Publish:\n  title: publish a message.\n  title_abbrev: Publish\n  languages: {}\n",
        )
        .unwrap();
        let mut config = ValidationConfig::default();

        let lenient = validator(dir.path()).with_config(&config).validate_all().unwrap();
        config.strict_titles = true;
        let strict = validator(dir.path()).with_config(&config).validate_all().unwrap();

        assert!(lenient.is_empty(), "{}", lenient);
        assert_eq!(strict.len(), 1);
        assert!(matches!(
            strict.iter().next(),
            Some(MetadataError::InvalidTitle { id, .. }) if id == "sns_Publish"
        ));
    }

    #[test]
    fn test_unparseable_document_is_a_finding() {
        let dir = doc_gen();
        fs::write(dir.path().join("schema/example_schema.yaml"), "any()\n").unwrap();
        let file = dir.path().join("metadata/sns_metadata.yaml");
        fs::write(&file, "key: [unclosed\n").unwrap();

        let errors = validator(dir.path()).validate_all().unwrap();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.iter().next(),
            Some(MetadataError::YamlParse { file: f, .. }) if *f == file
        ));
    }
}
