//! Validators specific to documentation metadata.
//!
//! Reference data (known services, SDKs and block-content files) is loaded
//! once by the caller and handed to each validator as a shared
//! `Arc<ReferenceData>` when the metadata validator table is built.

use crate::constraints::parse_date;
use crate::{Args, SyntaxResult};
use docmeta_core::{DataValue, ReferenceData};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static EXAMPLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\da-z-]+(_[\da-zA-Z]+)+$").expect("valid"));

const END_PUNCTUATION: &[char] = &['!', '.', '?'];

/// A metadata-specific check applied in place of a plain type check.
#[derive(Debug, Clone)]
pub enum DomainValidator {
    /// A key of `services.yaml`
    ServiceName(Arc<ReferenceData>),
    /// An id ending in a `%Y-%m-%d` date, e.g. `ddb_Query-2023-01-15`
    ServiceVersion,
    /// `<service>_<Name>[_<Name>...]` where service is known or `cross`
    ExampleId(Arc<ReferenceData>),
    /// A file in the cross-content folder
    BlockContent(Arc<ReferenceData>),
    /// A known SDK name, or `Name:version` with a known major version
    SdkVersion(Arc<ReferenceData>),
    /// A string with casing and punctuation rules
    StringExtension(StringRules),
}

impl DomainValidator {
    /// Returns a failure message, or `None` when `value` is accepted.
    pub fn check(&self, tag: &str, value: &DataValue) -> Option<String> {
        let valid = match self {
            DomainValidator::ServiceName(reference) => value
                .as_str()
                .map(|s| reference.is_known_service(s))
                .unwrap_or(false),
            DomainValidator::ServiceVersion => {
                value.as_str().map(is_service_version).unwrap_or(false)
            }
            DomainValidator::ExampleId(reference) => value
                .as_str()
                .map(|s| is_example_id(s, reference))
                .unwrap_or(false),
            DomainValidator::BlockContent(reference) => value
                .as_str()
                .map(|s| reference.has_block_content(s))
                .unwrap_or(false),
            DomainValidator::SdkVersion(reference) => {
                !value.is_null() && is_sdk_version(&value.key_text(), reference)
            }
            DomainValidator::StringExtension(rules) => return rules.check(tag, value),
        };

        if valid {
            None
        } else {
            Some(format!("'{}' is not a {}.", value, tag))
        }
    }
}

fn is_service_version(value: &str) -> bool {
    let mut start = value.len();
    for _ in 0..3 {
        match value[..start].rfind('-') {
            Some(index) => start = index,
            None => {
                start = 0;
                break;
            }
        }
    }
    let date = if start == 0 && !value.starts_with('-') {
        value
    } else {
        &value[start + 1..]
    };
    parse_date(date).is_some()
}

fn is_example_id(value: &str, reference: &ReferenceData) -> bool {
    if !EXAMPLE_ID.is_match(value) {
        return false;
    }
    let prefix = value.split('_').next().unwrap_or_default();
    prefix == "cross" || reference.is_known_service(prefix)
}

fn is_sdk_version(value: &str, reference: &ReferenceData) -> bool {
    match value.split_once(':') {
        Some((sdk, version)) => reference.has_sdk_version(sdk, version),
        None => reference.is_known_sdk(value),
    }
}

/// Options of the extended `str` validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRules {
    /// Reject a bare `AWS` that is not written as the `&AWS;` entity
    pub check_aws: bool,
    pub upper_start: bool,
    pub lower_start: bool,
    /// Must end in `!`, `.` or `?`
    pub end_punc: bool,
    pub no_end_punc: bool,
    pub end_punc_or_colon: bool,
    pub end_punc_or_semicolon: bool,
}

impl StringRules {
    /// Reads the rule flags from call arguments. `check_aws` defaults to on.
    pub fn from_args(args: &Args) -> SyntaxResult<Self> {
        Ok(Self {
            check_aws: args.flag("check_aws", true)?,
            upper_start: args.flag("upper_start", false)?,
            lower_start: args.flag("lower_start", false)?,
            end_punc: args.flag("end_punc", false)?,
            no_end_punc: args.flag("no_end_punc", false)?,
            end_punc_or_colon: args.flag("end_punc_or_colon", false)?,
            end_punc_or_semicolon: args.flag("end_punc_or_semicolon", false)?,
        })
    }

    /// Applies the rules in order and reports the first one that fails.
    ///
    /// The string type check runs last, so non-string values skip straight
    /// to it.
    pub fn check(&self, tag: &str, value: &DataValue) -> Option<String> {
        let Some(text) = value.as_str() else {
            return Some(format!("'{}' is not a {}.", value, tag));
        };
        let last = text.chars().last();

        if self.check_aws && has_raw_aws(text) {
            return Some(format!(
                "'{}' contains a bare AWS, write it as the &AWS; entity.",
                text
            ));
        }
        if self.upper_start && !text.chars().next().is_some_and(char::is_uppercase) {
            return Some(format!("'{}' must start with an uppercase letter.", text));
        }
        if self.lower_start && !text.chars().next().is_some_and(char::is_lowercase) {
            return Some(format!("'{}' must start with a lowercase letter.", text));
        }
        if self.end_punc && !last.is_some_and(|c| END_PUNCTUATION.contains(&c)) {
            return Some(format!("'{}' must end with punctuation (!.?).", text));
        }
        if self.no_end_punc && last.is_some_and(|c| END_PUNCTUATION.contains(&c)) {
            return Some(format!("'{}' must not end with punctuation (!.?).", text));
        }
        if self.end_punc_or_colon && !last.is_some_and(|c| END_PUNCTUATION.contains(&c) || c == ':')
        {
            return Some(format!(
                "'{}' must end with punctuation (!.?) or a colon.",
                text
            ));
        }
        if self.end_punc_or_semicolon
            && !last.is_some_and(|c| END_PUNCTUATION.contains(&c) || c == ';')
        {
            return Some(format!(
                "'{}' must end with punctuation (!.?) or a semicolon.",
                text
            ));
        }
        None
    }
}

/// True if `AWS` appears on its own rather than as an entity or inside a
/// larger identifier.
fn has_raw_aws(text: &str) -> bool {
    let before_ok = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '&');
    let after_ok = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | ';');

    text.match_indices("AWS").any(|(index, matched)| {
        let before = text[..index].chars().next_back();
        let after = text[index + matched.len()..].chars().next();
        !before.is_some_and(before_ok) && !after.is_some_and(after_ok)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, ValidatorRegistry};
    use docmeta_core::ReferenceDataBuilder;
    use pretty_assertions::assert_eq;

    fn reference() -> Arc<ReferenceData> {
        Arc::new(
            ReferenceDataBuilder::new()
                .services(["sns", "s3", "dynamodb"])
                .sdk("Python", ["3"])
                .sdk("Java", ["1", "2"])
                .block_content("cross_Demo.xml")
                .build(),
        )
    }

    fn check(validator: &DomainValidator, value: &str) -> bool {
        validator.check("test", &DataValue::string(value)).is_none()
    }

    #[test]
    fn test_example_id_shape_and_membership() {
        let id = DomainValidator::ExampleId(reference());

        assert!(check(&id, "sns_Subscribe_Email"));
        assert!(check(&id, "cross_AnythingHere"));
        assert!(!check(&id, "SNS_Subscribe"));
        assert!(!check(&id, "ec2_Describe"));
        assert!(!check(&id, "sns"));
    }

    #[test]
    fn test_example_id_cross_needs_no_services() {
        let id = DomainValidator::ExampleId(Arc::new(ReferenceData::new()));

        assert!(check(&id, "cross_AnythingHere"));
        assert!(!check(&id, "sns_Subscribe"));
    }

    #[test]
    fn test_service_version_reverse_date() {
        let version = DomainValidator::ServiceVersion;

        assert!(check(&version, "ddb_Query_Basic-2023-01-15"));
        assert!(check(&version, "svc-op-sub-2023-01-01"));
        assert!(check(&version, "2023-01-15"));
        assert!(!check(&version, "ddb_Query-01-15"));
        assert!(!check(&version, "ddb_Query-15"));
        assert!(!check(&version, "ddb_Query-2023-13-15"));
        assert!(version.check("service_version", &DataValue::Int(3)).is_some());
    }

    #[test]
    fn test_service_name_block_content_and_sdk() {
        let reference = reference();

        assert!(check(&DomainValidator::ServiceName(reference.clone()), "sns"));
        assert!(!check(&DomainValidator::ServiceName(reference.clone()), "ec2"));
        assert!(check(
            &DomainValidator::BlockContent(reference.clone()),
            "cross_Demo.xml"
        ));
        assert!(!check(
            &DomainValidator::BlockContent(reference.clone()),
            "missing.xml"
        ));

        let sdk = DomainValidator::SdkVersion(reference);
        assert!(check(&sdk, "Python"));
        assert!(check(&sdk, "Java:2"));
        assert!(!check(&sdk, "Java:3"));
        assert!(!check(&sdk, "Cobol"));
    }

    #[test]
    fn test_failure_message_uses_tag() {
        let message = DomainValidator::ServiceName(reference())
            .check("service_name", &DataValue::string("ec2"));

        assert_eq!(message, Some("'ec2' is not a service_name.".to_string()));
    }

    #[test]
    fn test_raw_aws_detection() {
        assert!(has_raw_aws("Use AWS to deploy"));
        assert!(has_raw_aws("AWS"));
        assert!(!has_raw_aws("Use &AWS; to deploy"));
        assert!(!has_raw_aws("The AWSCLI tool"));
        assert!(!has_raw_aws("FOO_AWS"));
        assert!(!has_raw_aws("Set AWS_REGION first"));
        assert!(has_raw_aws("Deploy the my-AWS-stack"));
        assert!(has_raw_aws("AWS-managed keys"));
    }

    #[test]
    fn test_string_rules_first_failure_wins() {
        let rules = StringRules {
            check_aws: true,
            upper_start: true,
            end_punc: true,
            ..StringRules::default()
        };

        let aws = rules.check("str", &DataValue::string("deploy with AWS"));
        assert!(aws.unwrap().contains("&AWS;"));

        let upper = rules.check("str", &DataValue::string("deploy it"));
        assert_eq!(
            upper,
            Some("'deploy it' must start with an uppercase letter.".to_string())
        );

        let punc = rules.check("str", &DataValue::string("Deploy it"));
        assert_eq!(
            punc,
            Some("'Deploy it' must end with punctuation (!.?).".to_string())
        );

        assert_eq!(rules.check("str", &DataValue::string("Deploy it.")), None);
    }

    #[test]
    fn test_string_rules_type_check_runs_last() {
        let rules = StringRules {
            upper_start: true,
            ..StringRules::default()
        };

        assert_eq!(
            rules.check("str", &DataValue::Int(5)),
            Some("'5' is not a str.".to_string())
        );
    }

    #[test]
    fn test_colon_and_semicolon_endings() {
        let colon = StringRules {
            end_punc_or_colon: true,
            ..StringRules::default()
        };
        let semicolon = StringRules {
            end_punc_or_semicolon: true,
            ..StringRules::default()
        };

        assert_eq!(colon.check("str", &DataValue::string("Steps:")), None);
        assert!(colon.check("str", &DataValue::string("Steps;")).is_some());
        assert_eq!(semicolon.check("str", &DataValue::string("Steps;")), None);
        assert!(semicolon.check("str", &DataValue::string("Steps")).is_some());
    }

    #[test]
    fn test_metadata_table_replaces_str() {
        let registry = ValidatorRegistry::metadata_validators(reference());
        let validator = parse("str(upper_start=True, min=3)", &registry).unwrap();

        assert!(validator.validate_value(&DataValue::string("Hello")).is_empty());
        assert_eq!(
            validator.validate_value(&DataValue::string("hello")),
            vec!["'hello' must start with an uppercase letter."]
        );
        assert_eq!(
            validator.validate_value(&DataValue::string("Hi")),
            vec!["Length of Hi is less than 3"]
        );
    }

    #[test]
    fn test_metadata_table_check_aws_can_be_disabled() {
        let registry = ValidatorRegistry::metadata_validators(reference());
        let default = parse("str()", &registry).unwrap();
        let relaxed = parse("str(check_aws=False)", &registry).unwrap();
        let value = DataValue::string("Deploy with AWS");

        assert_eq!(default.validate_value(&value).len(), 1);
        assert!(relaxed.validate_value(&value).is_empty());
    }
}
