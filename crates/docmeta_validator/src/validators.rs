//! Validator types.
//!
//! A `Validator` is one compiled leaf of a schema tree: a primitive type
//! check, the constraints configured for it, and for container kinds the
//! child validators to recurse into. Validators are built once while a schema
//! compiles and are never mutated afterwards.

use crate::constraints::{parse_date, parse_datetime, BoundType, Constraint, ConstraintKind};
use crate::{Args, DomainValidator, SyntaxResult};
use docmeta_core::DataValue;
use regex::Regex;
use std::net::IpAddr;

const STRING_CONSTRAINTS: &[ConstraintKind] = &[
    ConstraintKind::LengthMin,
    ConstraintKind::LengthMax,
    ConstraintKind::CharacterExclude,
    ConstraintKind::StringEquals,
    ConstraintKind::StringStartsWith,
    ConstraintKind::StringEndsWith,
    ConstraintKind::StringMatches,
];
const RANGE_CONSTRAINTS: &[ConstraintKind] = &[ConstraintKind::Min, ConstraintKind::Max];
const LENGTH_CONSTRAINTS: &[ConstraintKind] =
    &[ConstraintKind::LengthMin, ConstraintKind::LengthMax];
const MAP_CONSTRAINTS: &[ConstraintKind] = &[
    ConstraintKind::LengthMin,
    ConstraintKind::LengthMax,
    ConstraintKind::Key,
];
const IP_CONSTRAINTS: &[ConstraintKind] = &[ConstraintKind::IpVersion];

/// The kind of value a validator accepts.
#[derive(Debug, Clone)]
pub enum ValidatorKind {
    /// Any string
    String,
    /// Integers only
    Integer,
    /// Integers or floats
    Number,
    /// Booleans
    Boolean,
    /// Only null
    Null,
    /// One of a fixed set of values
    Enum(Vec<DataValue>),
    /// A `%Y-%m-%d` date
    Day,
    /// A `%Y-%m-%d %H:%M:%S` timestamp
    Timestamp,
    /// A string matching at least one pattern
    Regex {
        /// Source patterns with their compiled form
        patterns: Vec<(String, Regex)>,
        /// Display name used in failure messages
        name: Option<String>,
    },
    /// An IPv4 or IPv6 address
    Ip,
    /// A map whose values match at least one child validator
    Map(Vec<Validator>),
    /// A list whose items match at least one child validator
    List(Vec<Validator>),
    /// A value matching at least one child validator
    Any(Vec<Validator>),
    /// Elements each matching at least one child validator
    Subset {
        validators: Vec<Validator>,
        allow_empty: bool,
    },
    /// A named sub-schema
    Include {
        name: String,
        /// Overrides the strictness of the including validation
        strict: Option<bool>,
    },
    /// A validator backed by reference data or string-style rules
    Domain(DomainValidator),
}

impl ValidatorKind {
    /// Constraints this kind reads from its call arguments, and the type
    /// Min/Max bounds convert to.
    fn constraint_kinds(&self) -> (&'static [ConstraintKind], BoundType) {
        match self {
            ValidatorKind::String | ValidatorKind::Domain(_) => {
                (STRING_CONSTRAINTS, BoundType::Int)
            }
            ValidatorKind::Integer => (RANGE_CONSTRAINTS, BoundType::Int),
            ValidatorKind::Number => (RANGE_CONSTRAINTS, BoundType::Float),
            ValidatorKind::Day => (RANGE_CONSTRAINTS, BoundType::Date),
            ValidatorKind::Timestamp => (RANGE_CONSTRAINTS, BoundType::DateTime),
            ValidatorKind::List(_) => (LENGTH_CONSTRAINTS, BoundType::Int),
            ValidatorKind::Map(_) => (MAP_CONSTRAINTS, BoundType::Int),
            ValidatorKind::Ip => (IP_CONSTRAINTS, BoundType::Int),
            _ => (&[], BoundType::Int),
        }
    }
}

/// A compiled schema leaf.
#[derive(Debug, Clone)]
pub struct Validator {
    /// Name the validator was called by in the schema, e.g. `str`
    pub tag: String,
    /// What the validator accepts
    pub kind: ValidatorKind,
    /// Constraints in declaration order, active or not
    pub constraints: Vec<Constraint>,
    /// A missing key is not an error
    pub is_optional: bool,
    /// A null value is accepted when the key is optional
    pub can_be_none: bool,
}

impl Validator {
    /// Builds a validator of `kind` from call arguments.
    ///
    /// Reads the common `required` (default true) and `none` (default true)
    /// keywords, then every constraint the kind supports.
    pub fn build(tag: impl Into<String>, kind: ValidatorKind, args: &Args) -> SyntaxResult<Self> {
        let (kinds, bound) = kind.constraint_kinds();
        let constraints = kinds
            .iter()
            .map(|k| Constraint::build(*k, bound, args))
            .collect::<SyntaxResult<Vec<_>>>()?;

        Ok(Self {
            tag: tag.into(),
            kind,
            constraints,
            is_optional: !args.flag("required", true)?,
            can_be_none: args.flag("none", true)?,
        })
    }

    /// Child validators of container kinds.
    pub fn children(&self) -> &[Validator] {
        match &self.kind {
            ValidatorKind::Map(children)
            | ValidatorKind::List(children)
            | ValidatorKind::Any(children)
            | ValidatorKind::Subset {
                validators: children,
                ..
            } => children,
            _ => &[],
        }
    }

    /// Checks the value's type, then every constraint.
    ///
    /// A type failure is reported alone; constraints only run on values of
    /// the right type.
    pub fn validate_value(&self, value: &DataValue) -> Vec<String> {
        if let Some(failure) = self.type_failure(value) {
            return vec![failure];
        }
        self.constraints
            .iter()
            .filter_map(|constraint| constraint.is_valid(value))
            .collect()
    }

    fn type_failure(&self, value: &DataValue) -> Option<String> {
        let valid = match &self.kind {
            ValidatorKind::String => matches!(value, DataValue::String(_)),
            ValidatorKind::Integer => matches!(value, DataValue::Int(_)),
            ValidatorKind::Number => matches!(value, DataValue::Int(_) | DataValue::Float(_)),
            ValidatorKind::Boolean => matches!(value, DataValue::Bool(_)),
            ValidatorKind::Null => value.is_null(),
            ValidatorKind::Enum(values) => {
                if values.contains(value) {
                    return None;
                }
                let options: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
                return Some(format!("'{}' not in ({})", value, options.join(", ")));
            }
            ValidatorKind::Day => value.as_str().and_then(parse_date).is_some(),
            ValidatorKind::Timestamp => value.as_str().and_then(parse_datetime).is_some(),
            ValidatorKind::Regex { patterns, name } => {
                let matched = value
                    .as_str()
                    .map(|s| patterns.iter().any(|(_, regex)| regex.is_match(s)))
                    .unwrap_or(false);
                if matched {
                    return None;
                }
                let name = name.as_deref().unwrap_or("regex match");
                return Some(format!("'{}' is not a {}.", value, name));
            }
            ValidatorKind::Ip => value
                .as_str()
                .map(|s| s.parse::<IpAddr>().is_ok())
                .unwrap_or(false),
            ValidatorKind::Map(_) => value.is_map(),
            ValidatorKind::List(_) => value.is_list(),
            ValidatorKind::Any(_) | ValidatorKind::Include { .. } => true,
            ValidatorKind::Subset { allow_empty, .. } => {
                if *allow_empty || !is_empty(value) {
                    return None;
                }
                return Some(format!("'{}' may not be an empty set.", value));
            }
            ValidatorKind::Domain(domain) => return domain.check(&self.tag, value),
        };

        if valid {
            None
        } else {
            Some(format!("'{}' is not a {}.", value, self.tag))
        }
    }
}

fn is_empty(value: &DataValue) -> bool {
    match value {
        DataValue::Null => true,
        other => other.len() == Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, ValidatorRegistry};
    use pretty_assertions::assert_eq;

    fn validator(expression: &str) -> Validator {
        parse(expression, &ValidatorRegistry::builtin()).unwrap()
    }

    #[test]
    fn test_required_and_none_defaults() {
        let v = validator("str()");

        assert!(!v.is_optional);
        assert!(v.can_be_none);
    }

    #[test]
    fn test_type_failure_uses_tag() {
        assert_eq!(
            validator("int()").validate_value(&DataValue::string("abc")),
            vec!["'abc' is not a int."]
        );
        assert_eq!(
            validator("bool()").validate_value(&DataValue::Int(1)),
            vec!["'1' is not a bool."]
        );
    }

    #[test]
    fn test_type_failure_skips_constraints() {
        let v = validator("str(min=10, equals='x')");

        assert_eq!(v.validate_value(&DataValue::Int(3)), vec!["'3' is not a str."]);
    }

    #[test]
    fn test_constraints_accumulate() {
        let v = validator("str(min=10, starts_with='x')");

        assert_eq!(
            v.validate_value(&DataValue::string("abc")),
            vec![
                "Length of abc is less than 10".to_string(),
                "abc does not start with x".to_string()
            ]
        );
    }

    #[test]
    fn test_number_accepts_int_and_float() {
        let v = validator("num(max=1.5)");

        assert!(v.validate_value(&DataValue::Int(1)).is_empty());
        assert!(v.validate_value(&DataValue::Float(1.25)).is_empty());
        assert_eq!(
            v.validate_value(&DataValue::Float(2.5)),
            vec!["2.5 is greater than 1.5"]
        );
    }

    #[test]
    fn test_enum_message_lists_options() {
        let v = validator("enum('a', 'b')");

        assert!(v.validate_value(&DataValue::string("a")).is_empty());
        assert_eq!(
            v.validate_value(&DataValue::string("c")),
            vec!["'c' not in ('a', 'b')"]
        );
    }

    #[test]
    fn test_day_and_timestamp() {
        assert!(validator("day()")
            .validate_value(&DataValue::string("2024-02-29"))
            .is_empty());
        assert!(!validator("day()")
            .validate_value(&DataValue::string("2023-02-29"))
            .is_empty());
        assert!(validator("timestamp(min='2020-01-01 00:00:00')")
            .validate_value(&DataValue::string("2021-03-04 05:06:07"))
            .is_empty());
    }

    #[test]
    fn test_regex_with_name() {
        let v = validator(r"regex('^\d+$', '^[a-f]+$', name='hex or digits')");

        assert!(v.validate_value(&DataValue::string("123")).is_empty());
        assert!(v.validate_value(&DataValue::string("beef")).is_empty());
        assert_eq!(
            v.validate_value(&DataValue::string("xyz")),
            vec!["'xyz' is not a hex or digits."]
        );
    }

    #[test]
    fn test_ip_version_constraint() {
        let v = validator("ip(version=6)");

        assert!(v.validate_value(&DataValue::string("fe80::1")).is_empty());
        assert_eq!(
            v.validate_value(&DataValue::string("10.0.0.1")),
            vec!["IP version of 10.0.0.1 is not 6"]
        );
        assert_eq!(
            v.validate_value(&DataValue::string("nope")),
            vec!["'nope' is not a ip."]
        );
    }

    #[test]
    fn test_map_key_constraint() {
        let v = validator("map(int(), key=int())");
        let data = DataValue::Map(vec![
            (DataValue::Int(1), DataValue::Int(1)),
            (DataValue::string("two"), DataValue::Int(2)),
        ]);

        assert_eq!(
            v.validate_value(&data),
            vec!["Key error - 'two' is not a int."]
        );
    }

    #[test]
    fn test_subset_empty_rules() {
        let strict = validator("subset(int())");
        let lenient = validator("subset(int(), allow_empty=True)");
        let empty = DataValue::List(vec![]);

        assert_eq!(
            strict.validate_value(&empty),
            vec!["'[]' may not be an empty set."]
        );
        assert!(lenient.validate_value(&empty).is_empty());
    }

    #[test]
    fn test_children() {
        let v = validator("any(int(), str())");
        let tags: Vec<&str> = v.children().iter().map(|c| c.tag.as_str()).collect();

        assert_eq!(tags, vec!["int", "str"]);
        assert!(validator("int()").children().is_empty());
    }
}
