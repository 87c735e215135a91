//! End-to-end validation of a `.doc_gen` folder.
//!
//! Builds a small but complete folder (reference data, an example schema with
//! includes, metadata documents) and checks the findings reported by
//! `MetadataValidator`.

use docmeta_core::MetadataError;
use docmeta_validator::MetadataValidator;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

const EXAMPLE_SCHEMA: &str = r#"map(include('example'), key=example_id())
---
example:
  title: str(upper_start=True, no_end_punc=True)
  title_abbrev: str()
  synopsis: str(required=False, end_punc=True)
  category: str(required=False)
  languages: map(include('language'), key=sdk_version())
  services: map(key=service_name(), required=False)
language:
  versions: list(include('version'))
version:
  sdk_version: int(min=1)
  github: str(required=False)
  sdkguide: str(required=False)
  block_content: block_content(required=False)
  excerpts: list(include('excerpt'), required=False)
excerpt:
  description: str(required=False)
  snippet_tags: list(str(), required=False)
"#;

const SNS_METADATA: &str = r#"sns_Subscribe:
  title: Subscribe an email address to a topic
  title_abbrev: Subscribe
  synopsis: subscribe an address.
  languages:
    Python:
      versions:
        - sdk_version: 3
          github: python/example_code/sns
          sdkguide: https://docs.aws.amazon.com/sdk-for-python/
          excerpts:
            - description: Subscribe.
              snippet_tags:
                - python.example_code.sns.Subscribe
  services:
    sns: {Subscribe}
cross_Workflow:
  title: Run a workflow
  title_abbrev: Workflow
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: cross_Workflow.xml
"#;

fn doc_gen() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for folder in ["metadata", "schema", "cross-content"] {
        fs::create_dir_all(root.join(folder)).unwrap();
    }
    fs::write(
        root.join("metadata/services.yaml"),
        "sns:\n  long: Amazon Simple Notification Service\ns3:\n  long: Amazon S3\n",
    )
    .unwrap();
    fs::write(
        root.join("metadata/sdks.yaml"),
        "Python:\n  sdk:\n    3: {}\nJava:\n  sdk:\n    2: {}\n",
    )
    .unwrap();
    fs::write(root.join("cross-content/cross_Workflow.xml"), "<para/>").unwrap();
    fs::write(root.join("schema/example_schema.yaml"), EXAMPLE_SCHEMA).unwrap();
    fs::write(root.join("metadata/sns_metadata.yaml"), SNS_METADATA).unwrap();
    dir
}

fn messages(doc_gen: &Path) -> Vec<String> {
    MetadataValidator::new(doc_gen)
        .unwrap()
        .validate_all()
        .unwrap()
        .iter()
        .map(|e| e.to_string())
        .collect()
}

#[test]
fn test_valid_doc_gen_has_no_findings() {
    let dir = doc_gen();

    assert_eq!(messages(dir.path()), Vec::<String>::new());
}

#[test]
fn test_schema_violations_are_path_qualified() {
    let dir = doc_gen();
    let file = dir.path().join("metadata/s3_metadata.yaml");
    fs::write(
        &file,
        r#"s3_PutObject:
  title: Put an object.
  title_abbrev: PutObject
  languages:
    Python:
      versions:
        - sdk_version: 0
          block_content: missing.xml
  owner: someone
"#,
    )
    .unwrap();

    let findings = messages(dir.path());
    let prefix = format!("{}: ", file.display());

    assert_eq!(
        findings,
        vec![
            format!("{}s3_PutObject.owner: Unexpected element", prefix),
            format!(
                "{}s3_PutObject.title: 'Put an object.' must not end with punctuation (!.?).",
                prefix
            ),
            format!(
                "{}s3_PutObject.languages.Python.versions.0.sdk_version: 0 is less than 1",
                prefix
            ),
            format!(
                "{}s3_PutObject.languages.Python.versions.0.block_content: 'missing.xml' is not a block_content.",
                prefix
            ),
        ]
    );
}

#[test]
fn test_unknown_example_id_stops_at_the_key() {
    let dir = doc_gen();
    fs::write(
        dir.path().join("metadata/ec2_metadata.yaml"),
        "ec2_Describe:\n  title: Describe instances\n  title_abbrev: Describe\n  languages:\n    Python:\n      versions: bad\n",
    )
    .unwrap();

    let errors = MetadataValidator::new(dir.path())
        .unwrap()
        .validate_all()
        .unwrap();

    assert_eq!(errors.len(), 1);
    assert!(errors
        .iter()
        .all(|e| matches!(e, MetadataError::SchemaViolation { .. })));
    assert!(errors.to_string().trim_end().ends_with(
        "ec2_metadata.yaml: Key error - 'ec2_Describe' is not a example_id."
    ));
}

#[test]
fn test_unknown_language() {
    let dir = doc_gen();
    fs::write(
        dir.path().join("metadata/sns2_metadata.yaml"),
        "sns_Describe:\n  title: Describe topics\n  title_abbrev: Describe\n  languages:\n    Cobol:\n      versions: []\n",
    )
    .unwrap();

    let errors = MetadataValidator::new(dir.path())
        .unwrap()
        .validate_all()
        .unwrap();
    let messages: Vec<String> = errors.iter().map(|e| e.message()).collect();

    assert_eq!(messages.len(), 2, "{:?}", messages);
    assert!(messages[0]
        .ends_with("sns_Describe.languages: Key error - 'Cobol' is not a sdk_version."));
    assert!(matches!(
        errors.iter().nth(1),
        Some(MetadataError::UnknownLanguage { language, .. }) if language == "Cobol"
    ));
}

#[test]
fn test_duplicate_example_across_files() {
    let dir = doc_gen();
    fs::write(
        dir.path().join("metadata/zz_metadata.yaml"),
        "cross_Workflow:\n  title: Run it again\n  title_abbrev: Again\n  languages:\n    Java:\n      versions:\n        - sdk_version: 2\n",
    )
    .unwrap();

    let errors = MetadataValidator::new(dir.path())
        .unwrap()
        .validate_all()
        .unwrap();

    assert_eq!(errors.len(), 1);
    match errors.iter().next() {
        Some(MetadataError::DuplicateExampleId {
            id,
            file,
            other_file,
        }) => {
            assert_eq!(id, "cross_Workflow");
            assert!(file.ends_with("zz_metadata.yaml"));
            assert!(other_file.ends_with("sns_metadata.yaml"));
        }
        other => panic!("expected duplicate id, got {:?}", other),
    }
}

#[test]
fn test_strict_titles_and_non_strict_schema() {
    let dir = doc_gen();
    fs::write(
        dir.path().join("metadata/s3_metadata.yaml"),
        "s3_List:\n  title: list buckets\n  title_abbrev: List\n  languages: {}\n  notes: extra\n",
    )
    .unwrap();

    let errors = MetadataValidator::new(dir.path())
        .unwrap()
        .with_strict(false)
        .with_strict_titles(true)
        .validate_all()
        .unwrap();
    let kinds: Vec<&str> = errors
        .iter()
        .map(|e| match e {
            MetadataError::SchemaViolation { .. } => "schema",
            MetadataError::InvalidTitle { .. } => "title",
            _ => "other",
        })
        .collect();

    assert_eq!(kinds, vec!["schema", "title"]);
}
