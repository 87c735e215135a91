//! Detection of strings shaped like AWS credentials.

use docmeta_core::{MetadataError, MetadataErrors, ValidationConfig};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

static ACCESS_KEY_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9]+").expect("valid"));

static ACCESS_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A[ACGIKNPRS][A-Z]{2}[A-Z0-9]{16}$").expect("valid"));

static SECRET_KEY_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9/+=]+").expect("valid"));

/// Access key ids: 20 characters, standing alone in a run of `[A-Z0-9]`.
fn access_keys(content: &str) -> impl Iterator<Item = &str> {
    ACCESS_KEY_RUN
        .find_iter(content)
        .map(|m| m.as_str())
        .filter(|run| run.len() == 20 && ACCESS_KEY.is_match(run))
}

/// Secret keys: exactly 40 base64 characters standing alone.
fn secret_keys(content: &str) -> impl Iterator<Item = &str> {
    SECRET_KEY_RUN
        .find_iter(content)
        .map(|m| m.as_str())
        .filter(|run| run.len() == 40)
}

/// Credential-shaped strings in `content` that are not allow-listed, sorted.
pub fn possible_secrets<'c>(content: &'c str, config: &ValidationConfig) -> BTreeSet<&'c str> {
    access_keys(content)
        .chain(secret_keys(content))
        .filter(|candidate| !config.is_allowed(candidate))
        .collect()
}

/// Records a `PossibleSecretKey` for each candidate found in `content`.
///
/// Returns the number of new errors added.
pub fn check(
    file: &Path,
    content: &str,
    config: &ValidationConfig,
    errors: &mut MetadataErrors,
) -> usize {
    errors.merge(
        possible_secrets(content, config)
            .into_iter()
            .map(|word| MetadataError::PossibleSecretKey {
                file: file.to_path_buf(),
                word: word.to_string(),
            }),
    )
}
