//! Builder pattern for configuration and reference data.
//!
//! This module provides fluent builders, mostly used by tests and by callers
//! that assemble configuration programmatically instead of loading it.

use crate::{ReferenceData, ValidationConfig};

/// Builder for creating a `ValidationConfig`.
///
/// # Example
///
/// ```rust
/// use docmeta_core::ValidationConfigBuilder;
///
/// let config = ValidationConfigBuilder::empty()
///     .allow("AKIAEXAMPLEEXAMPLE00")
///     .sample_file("clip.mp3")
///     .strict_titles(true)
///     .build();
///
/// assert!(config.is_allowed("AKIAEXAMPLEEXAMPLE00"));
/// assert!(config.strict_titles);
/// ```
#[derive(Debug)]
pub struct ValidationConfigBuilder {
    config: ValidationConfig,
}

impl ValidationConfigBuilder {
    /// Starts from the default configuration (static allow-list included).
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Starts from an empty configuration.
    pub fn empty() -> Self {
        Self {
            config: ValidationConfig::empty(),
        }
    }

    /// Adds an allow-listed string.
    pub fn allow(mut self, candidate: impl Into<String>) -> Self {
        self.config.allow_list.insert(candidate.into());
        self
    }

    /// Removes an allow-listed string.
    pub fn disallow(mut self, candidate: &str) -> Self {
        self.config.allow_list.remove(candidate);
        self
    }

    /// Adds an expected sample file.
    pub fn sample_file(mut self, name: impl Into<String>) -> Self {
        self.config.sample_files.insert(name.into());
        self
    }

    /// Sets title strictness.
    pub fn strict_titles(mut self, strict: bool) -> Self {
        self.config.strict_titles = strict;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ValidationConfig {
        self.config
    }
}

impl Default for ValidationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating `ReferenceData`.
///
/// # Example
///
/// ```rust
/// use docmeta_core::ReferenceDataBuilder;
///
/// let reference = ReferenceDataBuilder::new()
///     .service("sns")
///     .sdk("Python", ["3"])
///     .block_content("cross_FMPlayground.xml")
///     .build();
///
/// assert!(reference.is_known_service("sns"));
/// assert!(reference.has_sdk_version("Python", "3"));
/// ```
#[derive(Debug, Default)]
pub struct ReferenceDataBuilder {
    data: ReferenceData,
}

impl ReferenceDataBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a known service key.
    pub fn service(mut self, name: impl Into<String>) -> Self {
        self.data.services.insert(name.into());
        self
    }

    /// Adds several known service keys.
    pub fn services<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.services.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds an SDK with its versions.
    pub fn sdk<I, S>(mut self, name: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data
            .sdks
            .entry(name.into())
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Adds a block-content file name.
    pub fn block_content(mut self, file: impl Into<String>) -> Self {
        self.data.block_content.insert(file.into());
        self
    }

    /// Builds the reference data.
    pub fn build(self) -> ReferenceData {
        self.data
    }
}
