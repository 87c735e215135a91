//! Semantic checks on example metadata.
//!
//! Schema validation only looks at one document at a time. These checks run
//! after it and cover what a schema cannot express: SDK names resolved
//! against `sdks.yaml`, documentation link prefixes, title style, and example
//! ids that must be unique across every metadata file.

use docmeta_core::{DataValue, MetadataError, MetadataErrors, ReferenceData};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Required prefix of every `sdkguide` link.
pub const SDK_GUIDE_PREFIX: &str = "https://docs.aws.amazon.com/";

const REQUIRED_FIELDS: &[&str] = &["title", "title_abbrev", "languages"];

/// Checks example metadata documents, remembering ids across files.
#[derive(Debug)]
pub struct ExampleChecks {
    reference: Arc<ReferenceData>,
    strict_titles: bool,
    seen: HashMap<String, PathBuf>,
}

impl ExampleChecks {
    /// Creates checks backed by `reference`.
    pub fn new(reference: Arc<ReferenceData>, strict_titles: bool) -> Self {
        Self {
            reference,
            strict_titles,
            seen: HashMap::new(),
        }
    }

    /// Checks every example in `document`, a map of example id to example.
    ///
    /// Returns the number of new errors added.
    pub fn check(&mut self, file: &Path, document: &DataValue, errors: &mut MetadataErrors) -> usize {
        let mut found = Vec::new();
        for (id, example) in document.as_map().unwrap_or_default() {
            let id = id.key_text();
            self.check_example(file, &id, example, &mut found);

            if let Some(other_file) = self.seen.get(&id) {
                found.push(MetadataError::DuplicateExampleId {
                    file: file.to_path_buf(),
                    id,
                    other_file: other_file.clone(),
                });
            } else {
                self.seen.insert(id, file.to_path_buf());
            }
        }
        errors.merge(found)
    }

    fn check_example(&self, file: &Path, id: &str, example: &DataValue, found: &mut Vec<MetadataError>) {
        for field in REQUIRED_FIELDS {
            if example.get(field).is_none_or(DataValue::is_null) {
                found.push(MetadataError::MissingField {
                    file: file.to_path_buf(),
                    id: id.to_string(),
                    field: field.to_string(),
                });
            }
        }

        if self.strict_titles {
            if let Some(title) = example.get("title").and_then(DataValue::as_str) {
                if !is_title_case(title) {
                    found.push(MetadataError::InvalidTitle {
                        file: file.to_path_buf(),
                        id: id.to_string(),
                        title: title.to_string(),
                    });
                }
            }
        }

        let languages = example
            .get("languages")
            .and_then(DataValue::as_map)
            .unwrap_or_default();
        for (language, details) in languages {
            let language = language.key_text();
            if !self.reference.is_known_sdk(&language) {
                found.push(MetadataError::UnknownLanguage {
                    file: file.to_path_buf(),
                    id: id.to_string(),
                    language,
                });
            }

            let versions = details
                .get("versions")
                .and_then(DataValue::as_list)
                .unwrap_or_default();
            for version in versions {
                if let Some(guide) = version.get("sdkguide").and_then(DataValue::as_str) {
                    if !guide.starts_with(SDK_GUIDE_PREFIX) {
                        found.push(MetadataError::InvalidSdkGuideStart {
                            file: file.to_path_buf(),
                            id: id.to_string(),
                            guide: guide.to_string(),
                        });
                    }
                }
            }
        }
    }
}

fn is_title_case(title: &str) -> bool {
    title.chars().next().is_some_and(char::is_uppercase) && !title.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmeta_core::ReferenceDataBuilder;
    use docmeta_parser::parse_yaml;
    use pretty_assertions::assert_eq;

    const GOOD: &str = r#"
sns_Subscribe:
  title: Subscribe to a topic
  title_abbrev: Subscribe
  languages:
    Python:
      versions:
        - sdk_version: 3
          sdkguide: https://docs.aws.amazon.com/sdk-for-python/
"#;

    fn checks(strict_titles: bool) -> ExampleChecks {
        let reference = ReferenceDataBuilder::new()
            .service("sns")
            .sdk("Python", ["3"])
            .build();
        ExampleChecks::new(Arc::new(reference), strict_titles)
    }

    fn run(checks: &mut ExampleChecks, file: &str, yaml: &str) -> Vec<MetadataError> {
        let mut errors = MetadataErrors::new();
        checks.check(Path::new(file), &parse_yaml(yaml).unwrap(), &mut errors);
        errors.into_vec()
    }

    #[test]
    fn test_valid_example() {
        assert!(run(&mut checks(true), "sns_metadata.yaml", GOOD).is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let errors = run(
            &mut checks(false),
            "sns_metadata.yaml",
            "sns_Publish:\n  title: Publish\n  title_abbrev: ~\n",
        );

        assert_eq!(
            errors,
            vec![
                MetadataError::MissingField {
                    file: "sns_metadata.yaml".into(),
                    id: "sns_Publish".to_string(),
                    field: "title_abbrev".to_string(),
                },
                MetadataError::MissingField {
                    file: "sns_metadata.yaml".into(),
                    id: "sns_Publish".to_string(),
                    field: "languages".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_language_and_bad_guide() {
        let yaml = r#"
sns_Publish:
  title: Publish
  title_abbrev: Publish
  languages:
    Cobol:
      versions:
        - sdk_version: 1
          sdkguide: https://example.com/guide
"#;
        let errors = run(&mut checks(false), "sns_metadata.yaml", yaml);

        assert_eq!(
            errors,
            vec![
                MetadataError::UnknownLanguage {
                    file: "sns_metadata.yaml".into(),
                    id: "sns_Publish".to_string(),
                    language: "Cobol".to_string(),
                },
                MetadataError::InvalidSdkGuideStart {
                    file: "sns_metadata.yaml".into(),
                    id: "sns_Publish".to_string(),
                    guide: "https://example.com/guide".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_titles_only_checked_when_strict() {
        let yaml = "sns_Publish:\n  title: publish a message.\n  title_abbrev: Publish\n  languages: {}\n";

        assert!(run(&mut checks(false), "a.yaml", yaml).is_empty());
        assert_eq!(
            run(&mut checks(true), "a.yaml", yaml),
            vec![MetadataError::InvalidTitle {
                file: "a.yaml".into(),
                id: "sns_Publish".to_string(),
                title: "publish a message.".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicate_ids_across_files() {
        let mut checks = checks(false);

        assert!(run(&mut checks, "first_metadata.yaml", GOOD).is_empty());
        assert_eq!(
            run(&mut checks, "second_metadata.yaml", GOOD),
            vec![MetadataError::DuplicateExampleId {
                file: "second_metadata.yaml".into(),
                id: "sns_Subscribe".to_string(),
                other_file: "first_metadata.yaml".into(),
            }]
        );
    }

    #[test]
    fn test_title_case_rule() {
        assert!(is_title_case("Create a bucket"));
        assert!(!is_title_case("create a bucket"));
        assert!(!is_title_case("Create a bucket."));
        assert!(!is_title_case(""));
    }
}
