//! Document values for validation.
//!
//! Metadata documents are loaded from YAML into `DataValue`, which keeps map
//! entries in document order so that reported errors follow the file layout.

use std::fmt;

/// A value in a metadata document.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// List/sequence value
    List(Vec<DataValue>),
    /// Map value, entries in document order
    Map(Vec<(DataValue, DataValue)>),
}

impl DataValue {
    /// Builds a map value from string keys.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DataValue)>,
    {
        DataValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (DataValue::String(k.into()), v))
                .collect(),
        )
    }

    /// Builds a string value.
    pub fn string(value: impl Into<String>) -> Self {
        DataValue::String(value.into())
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns true if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, DataValue::Map(_))
    }

    /// Returns true if this value is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, DataValue::List(_))
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "number",
            DataValue::String(_) => "string",
            DataValue::List(_) => "list",
            DataValue::Map(_) => "map",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as a list.
    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to get this value as map entries.
    pub fn as_map(&self) -> Option<&[(DataValue, DataValue)]> {
        match self {
            DataValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of elements for strings (in characters), lists and maps.
    pub fn len(&self) -> Option<usize> {
        match self {
            DataValue::String(s) => Some(s.chars().count()),
            DataValue::List(items) => Some(items.len()),
            DataValue::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Looks up a map entry by its key rendered as text.
    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.key_text() == key)
            .map(|(_, v)| v)
    }

    /// Looks up a child by path key: map entries by name, list items by index.
    pub fn child(&self, key: &crate::PathKey) -> Option<&DataValue> {
        match (self, key) {
            (DataValue::List(items), crate::PathKey::Index(i)) => items.get(*i),
            (DataValue::Map(_), crate::PathKey::Name(name)) => self.get(name),
            (DataValue::Map(_), crate::PathKey::Index(i)) => self.get(&i.to_string()),
            _ => None,
        }
    }

    /// Renders a scalar for use as a map key or path segment.
    pub fn key_text(&self) -> String {
        match self {
            DataValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "None"),
            DataValue::Bool(true) => write!(f, "True"),
            DataValue::Bool(false) => write!(f, "False"),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(x) => write!(f, "{}", x),
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            DataValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}
