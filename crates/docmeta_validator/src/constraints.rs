//! Constraint validation logic.
//!
//! A constraint is a single configurable rule attached to a validator:
//! - Min / Max: numeric or date bounds
//! - LengthMin / LengthMax: bounds on string, list or map length
//! - Key: every map key must satisfy a validator
//! - StringEquals / StringStartsWith / StringEndsWith / StringMatches
//! - CharacterExclude: none of a set of characters may appear
//! - IpVersion: an IP address of a given version
//!
//! Constraints are built from the keyword arguments of a validator call. A
//! constraint whose keywords were not supplied is inactive and never fails.

use crate::{Args, SyntaxError, SyntaxResult, Validator};
use chrono::{NaiveDate, NaiveDateTime};
use docmeta_core::DataValue;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The kinds of constraint a validator can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Min,
    Max,
    LengthMin,
    LengthMax,
    Key,
    StringEquals,
    StringStartsWith,
    StringEndsWith,
    StringMatches,
    CharacterExclude,
    IpVersion,
}

impl ConstraintKind {
    /// Keyword options this constraint reads from a validator call.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ConstraintKind::Min | ConstraintKind::LengthMin => &["min"],
            ConstraintKind::Max | ConstraintKind::LengthMax => &["max"],
            ConstraintKind::Key => &["key"],
            ConstraintKind::StringEquals => &["equals", "ignore_case"],
            ConstraintKind::StringStartsWith => &["starts_with", "ignore_case"],
            ConstraintKind::StringEndsWith => &["ends_with", "ignore_case"],
            ConstraintKind::StringMatches => &["matches"],
            ConstraintKind::CharacterExclude => &["exclude", "ignore_case"],
            ConstraintKind::IpVersion => &["version"],
        }
    }
}

/// The value type Min and Max bounds convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundType {
    Int,
    Float,
    Date,
    DateTime,
}

impl BoundType {
    fn name(&self) -> &'static str {
        match self {
            BoundType::Int => "int",
            BoundType::Float => "float",
            BoundType::Date => "date",
            BoundType::DateTime => "datetime",
        }
    }
}

/// A converted Min/Max bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Int(i) => write!(f, "{}", i),
            Bound::Float(x) => write!(f, "{}", x),
            Bound::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Bound::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl Bound {
    fn compare(&self, value: &DataValue) -> Option<Ordering> {
        match self {
            Bound::Int(i) => value.as_float()?.partial_cmp(&(*i as f64)),
            Bound::Float(x) => value.as_float()?.partial_cmp(x),
            Bound::Date(d) => parse_date(value.as_str()?).map(|v| v.cmp(d)),
            Bound::DateTime(dt) => parse_datetime(value.as_str()?).map(|v| v.cmp(dt)),
        }
    }
}

/// A configured rule over a single value.
#[derive(Debug, Clone)]
pub enum Constraint {
    Min {
        min: Option<Bound>,
    },
    Max {
        max: Option<Bound>,
    },
    LengthMin {
        min: Option<usize>,
    },
    LengthMax {
        max: Option<usize>,
    },
    Key {
        validator: Option<Box<Validator>>,
    },
    StringEquals {
        equals: Option<String>,
        ignore_case: Option<bool>,
    },
    StringStartsWith {
        starts_with: Option<String>,
        ignore_case: Option<bool>,
    },
    StringEndsWith {
        ends_with: Option<String>,
        ignore_case: Option<bool>,
    },
    StringMatches {
        matches: Option<(String, Regex)>,
    },
    CharacterExclude {
        exclude: Option<String>,
        ignore_case: Option<bool>,
    },
    IpVersion {
        version: Option<u8>,
    },
}

impl Constraint {
    /// Builds a constraint from the keyword arguments in `args`.
    ///
    /// Keywords that are present are converted to the constraint's value
    /// type; a conversion failure is a `SyntaxError` naming the keyword.
    pub fn build(kind: ConstraintKind, bound: BoundType, args: &Args) -> SyntaxResult<Self> {
        let constraint = match kind {
            ConstraintKind::Min => Constraint::Min {
                min: keyword(args, "min", |v| to_bound("min", v, bound))?,
            },
            ConstraintKind::Max => Constraint::Max {
                max: keyword(args, "max", |v| to_bound("max", v, bound))?,
            },
            ConstraintKind::LengthMin => Constraint::LengthMin {
                min: keyword(args, "min", |v| to_length("min", v))?,
            },
            ConstraintKind::LengthMax => Constraint::LengthMax {
                max: keyword(args, "max", |v| to_length("max", v))?,
            },
            ConstraintKind::Key => Constraint::Key {
                validator: match args.keyword("key") {
                    None => None,
                    Some(arg) => Some(Box::new(arg.as_validator().cloned().ok_or_else(
                        || SyntaxError::new("key is not a Validator"),
                    )?)),
                },
            },
            ConstraintKind::StringEquals => Constraint::StringEquals {
                equals: keyword(args, "equals", |v| to_text("equals", v))?,
                ignore_case: keyword(args, "ignore_case", |v| to_bool("ignore_case", v))?,
            },
            ConstraintKind::StringStartsWith => Constraint::StringStartsWith {
                starts_with: keyword(args, "starts_with", |v| to_text("starts_with", v))?,
                ignore_case: keyword(args, "ignore_case", |v| to_bool("ignore_case", v))?,
            },
            ConstraintKind::StringEndsWith => Constraint::StringEndsWith {
                ends_with: keyword(args, "ends_with", |v| to_text("ends_with", v))?,
                ignore_case: keyword(args, "ignore_case", |v| to_bool("ignore_case", v))?,
            },
            ConstraintKind::StringMatches => Constraint::StringMatches {
                matches: keyword(args, "matches", |v| {
                    let pattern = to_text("matches", v)?;
                    let regex = Regex::new(&format!("^(?:{})", pattern))
                        .map_err(|_| SyntaxError::new("matches is not a regex"))?;
                    Ok((pattern, regex))
                })?,
            },
            ConstraintKind::CharacterExclude => Constraint::CharacterExclude {
                exclude: keyword(args, "exclude", |v| to_text("exclude", v))?,
                ignore_case: keyword(args, "ignore_case", |v| to_bool("ignore_case", v))?,
            },
            ConstraintKind::IpVersion => Constraint::IpVersion {
                version: keyword(args, "version", |v| match to_length("version", v)? {
                    4 => Ok(4),
                    6 => Ok(6),
                    _ => Err(SyntaxError::new("version is not an IP version (4 or 6)")),
                })?,
            },
        };
        Ok(constraint)
    }

    /// Returns true if any of this constraint's keywords were supplied.
    pub fn is_active(&self) -> bool {
        match self {
            Constraint::Min { min } => min.is_some(),
            Constraint::Max { max } => max.is_some(),
            Constraint::LengthMin { min } => min.is_some(),
            Constraint::LengthMax { max } => max.is_some(),
            Constraint::Key { validator } => validator.is_some(),
            Constraint::StringEquals {
                equals: value,
                ignore_case,
            }
            | Constraint::StringStartsWith {
                starts_with: value,
                ignore_case,
            }
            | Constraint::StringEndsWith {
                ends_with: value,
                ignore_case,
            }
            | Constraint::CharacterExclude {
                exclude: value,
                ignore_case,
            } => value.is_some() || ignore_case.is_some(),
            Constraint::StringMatches { matches } => matches.is_some(),
            Constraint::IpVersion { version } => version.is_some(),
        }
    }

    /// Checks `value`, returning `None` when valid or a failure message.
    ///
    /// Inactive constraints always return `None`.
    pub fn is_valid(&self, value: &DataValue) -> Option<String> {
        if !self.is_active() {
            return None;
        }

        match self {
            Constraint::Min { min: Some(min) } => match min.compare(value) {
                Some(Ordering::Less) => Some(format!("{} is less than {}", value, min)),
                _ => None,
            },
            Constraint::Max { max: Some(max) } => match max.compare(value) {
                Some(Ordering::Greater) => Some(format!("{} is greater than {}", value, max)),
                _ => None,
            },
            Constraint::LengthMin { min: Some(min) } => match value.len() {
                Some(len) if len < *min => {
                    Some(format!("Length of {} is less than {}", value, min))
                }
                _ => None,
            },
            Constraint::LengthMax { max: Some(max) } => match value.len() {
                Some(len) if len > *max => {
                    Some(format!("Length of {} is greater than {}", value, max))
                }
                _ => None,
            },
            Constraint::Key {
                validator: Some(validator),
            } => {
                let errors: Vec<String> = value
                    .as_map()
                    .unwrap_or_default()
                    .iter()
                    .flat_map(|(key, _)| validator.validate_value(key))
                    .collect();
                if errors.is_empty() {
                    None
                } else {
                    Some(format!("Key error - {}", errors.join(", ")))
                }
            }
            Constraint::StringEquals {
                equals,
                ignore_case,
            } => string_rule(value, equals, *ignore_case, |v, e| v == e)
                .map(|e| format!("{} does not equal {}", value, e)),
            Constraint::StringStartsWith {
                starts_with,
                ignore_case,
            } => string_rule(value, starts_with, *ignore_case, |v, p| v.starts_with(p))
                .map(|p| format!("{} does not start with {}", value, p)),
            Constraint::StringEndsWith {
                ends_with,
                ignore_case,
            } => string_rule(value, ends_with, *ignore_case, |v, s| v.ends_with(s))
                .map(|s| format!("{} does not end with {}", value, s)),
            Constraint::StringMatches {
                matches: Some((pattern, regex)),
            } => match value.as_str() {
                Some(s) if !regex.is_match(s) => {
                    Some(format!("{} does not match regex '{}'", value, pattern))
                }
                _ => None,
            },
            Constraint::CharacterExclude {
                exclude: Some(exclude),
                ignore_case,
            } => {
                let text = value.as_str()?;
                let found = excluded_character(text, exclude, ignore_case.unwrap_or(false))?;
                Some(format!(
                    "'{}' contains excluded character '{}'",
                    value, found
                ))
            }
            Constraint::IpVersion {
                version: Some(version),
            } => {
                let matches = match value.as_str().map(str::parse::<IpAddr>) {
                    Some(Ok(IpAddr::V4(_))) => *version == 4,
                    Some(Ok(IpAddr::V6(_))) => *version == 6,
                    _ => false,
                };
                if matches {
                    None
                } else {
                    Some(format!("IP version of {} is not {}", value, version))
                }
            }
            _ => None,
        }
    }
}

/// The first character of `exclude`, in declared order, found in `text`.
fn excluded_character(text: &str, exclude: &str, ignore_case: bool) -> Option<char> {
    if ignore_case {
        let lowered = text.to_lowercase();
        exclude
            .chars()
            .find(|c| c.to_lowercase().any(|lc| lowered.contains(lc)))
    } else {
        exclude.chars().find(|c| text.contains(*c))
    }
}

/// Shared logic for the string comparison constraints.
///
/// Returns the expected text when the rule fails. `ignore_case` on its own,
/// without the primary keyword, is always valid.
fn string_rule<'a>(
    value: &DataValue,
    expected: &'a Option<String>,
    ignore_case: Option<bool>,
    check: impl Fn(&str, &str) -> bool,
) -> Option<&'a str> {
    let expected = expected.as_deref()?;
    let text = value.as_str()?;
    let passed = if ignore_case.unwrap_or(false) {
        check(&text.to_lowercase(), &expected.to_lowercase())
    } else {
        check(text, expected)
    };
    if passed { None } else { Some(expected) }
}

fn keyword<T>(
    args: &Args,
    key: &str,
    convert: impl FnOnce(&DataValue) -> SyntaxResult<T>,
) -> SyntaxResult<Option<T>> {
    match args.keyword(key) {
        None => Ok(None),
        Some(arg) => match arg.as_value() {
            Some(value) => convert(value).map(Some),
            None => Err(SyntaxError::new(format!("{} is not a value", key))),
        },
    }
}

fn to_bound(key: &str, value: &DataValue, bound: BoundType) -> SyntaxResult<Bound> {
    let fail = || SyntaxError::new(format!("{} is not a {}", key, bound.name()));
    match bound {
        BoundType::Int => match value {
            DataValue::Int(i) => Ok(Bound::Int(*i)),
            DataValue::String(s) => s.trim().parse().map(Bound::Int).map_err(|_| fail()),
            _ => Err(fail()),
        },
        BoundType::Float => match value {
            DataValue::Int(i) => Ok(Bound::Float(*i as f64)),
            DataValue::Float(x) => Ok(Bound::Float(*x)),
            DataValue::String(s) => s.trim().parse().map(Bound::Float).map_err(|_| fail()),
            _ => Err(fail()),
        },
        BoundType::Date => value
            .as_str()
            .and_then(parse_date)
            .map(Bound::Date)
            .ok_or_else(fail),
        BoundType::DateTime => value
            .as_str()
            .and_then(parse_datetime)
            .map(Bound::DateTime)
            .ok_or_else(fail),
    }
}

fn to_length(key: &str, value: &DataValue) -> SyntaxResult<usize> {
    let fail = || SyntaxError::new(format!("{} is not a int", key));
    match value {
        DataValue::Int(i) => usize::try_from(*i).map_err(|_| fail()),
        DataValue::String(s) => s.trim().parse().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

fn to_text(key: &str, value: &DataValue) -> SyntaxResult<String> {
    match value {
        DataValue::String(s) => Ok(s.clone()),
        DataValue::Int(_) | DataValue::Float(_) | DataValue::Bool(_) => Ok(value.to_string()),
        _ => Err(SyntaxError::new(format!("{} is not a str", key))),
    }
}

fn to_bool(key: &str, value: &DataValue) -> SyntaxResult<bool> {
    match value {
        DataValue::Bool(b) => Ok(*b),
        DataValue::Int(i) => Ok(*i != 0),
        _ => Err(SyntaxError::new(format!("{} is not a bool", key))),
    }
}

/// Parses a `%Y-%m-%d` date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Parses a `%Y-%m-%d %H:%M:%S` timestamp; a `T` separator is also accepted.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
