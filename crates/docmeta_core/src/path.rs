//! Locations inside a nested document.

use std::fmt;
use std::ops::Add;

/// A single step in a `DataPath`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// Map key
    Name(String),
    /// List index
    Index(usize),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Name(name) => write!(f, "{}", name),
            PathKey::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathKey {
    fn from(value: &str) -> Self {
        PathKey::Name(value.to_string())
    }
}

impl From<String> for PathKey {
    fn from(value: String) -> Self {
        PathKey::Name(value)
    }
}

impl From<usize> for PathKey {
    fn from(value: usize) -> Self {
        PathKey::Index(value)
    }
}

/// An immutable, ordered sequence of keys and indices.
///
/// Paths are never mutated in place: `join` and `+` return a new path, so a
/// path handed to a recursive call stays valid for the caller.
///
/// ```rust
/// use docmeta_core::DataPath;
///
/// let services = DataPath::new("services");
/// let name = &services.join(0usize) + &DataPath::new("name");
/// assert_eq!(name.to_string(), "services.0.name");
/// assert_eq!(services.to_string(), "services");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataPath(Vec<PathKey>);

impl DataPath {
    /// The empty path at the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// A path with a single key.
    pub fn new(key: impl Into<PathKey>) -> Self {
        Self(vec![key.into()])
    }

    /// Returns a new path extended by `key`.
    pub fn join(&self, key: impl Into<PathKey>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.into());
        Self(keys)
    }

    /// The keys making up this path.
    pub fn keys(&self) -> &[PathKey] {
        &self.0
    }

    /// Returns true for the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Add<&DataPath> for &DataPath {
    type Output = DataPath;

    fn add(self, rhs: &DataPath) -> DataPath {
        let mut keys = self.0.clone();
        keys.extend(rhs.0.iter().cloned());
        DataPath(keys)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}
