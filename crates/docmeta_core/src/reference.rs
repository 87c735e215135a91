//! Reference data consulted by the domain-specific validators.
//!
//! Loaded once from `services.yaml`, `sdks.yaml` and the block-content folder,
//! then shared read-only (usually behind an `Arc`) by every validator that
//! needs it.

use std::collections::{BTreeMap, BTreeSet};

/// Known services, SDKs and block-content files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    /// Service keys from `services.yaml`
    pub services: BTreeSet<String>,

    /// SDK names from `sdks.yaml`, each with its known major versions
    pub sdks: BTreeMap<String, BTreeSet<String>>,

    /// File names available as block content
    pub block_content: BTreeSet<String>,
}

impl ReferenceData {
    /// Creates empty reference data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `name` is a known service key.
    pub fn is_known_service(&self, name: &str) -> bool {
        self.services.contains(name)
    }

    /// Returns true if `name` is a known SDK.
    pub fn is_known_sdk(&self, name: &str) -> bool {
        self.sdks.contains_key(name)
    }

    /// Returns true if `sdk` declares `version`.
    pub fn has_sdk_version(&self, sdk: &str, version: &str) -> bool {
        self.sdks
            .get(sdk)
            .map(|versions| versions.contains(version))
            .unwrap_or(false)
    }

    /// Returns true if `file` is a known block-content file.
    pub fn has_block_content(&self, file: &str) -> bool {
        self.block_content.contains(file)
    }
}
