//! Words that must not appear in published examples.
//!
//! The deny set is a static list of internal hostnames plus a profanity list.
//! The profanity list comes from a `ProfanitySource`, so offline runs and tests
//! never touch the network.

use crate::{Result, ScanError};
use docmeta_core::{MetadataError, MetadataErrors};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Internal hostnames that must never leak into examples.
pub const DENY_WORDS: &[&str] = &[
    "alpha-docs-aws.amazon.com",
    "integ-docs-aws.amazon.com",
    "alpha.www.docs.aws.a2z.com",
];

/// Built-in profanity list used offline.
pub const PINNED_PROFANITY: &[&str] = &[
    "arse",
    "arsehole",
    "asshole",
    "bastard",
    "bitch",
    "bollocks",
    "bullshit",
    "crap",
    "dickhead",
    "fuck",
    "fucking",
    "motherfucker",
    "piss",
    "shit",
    "shitty",
    "wanker",
];

/// Entries of remote word lists that are ordinary programming vocabulary.
pub const FALSE_POSITIVES: &[&str] = &[
    "abort",
    "attack",
    "bang",
    "blow",
    "die",
    "dummy",
    "execute",
    "fail",
    "hook",
    "kill",
    "master",
    "nuke",
    "pawn",
    "slave",
    "strip",
    "terminate",
    "trash",
];

/// Where the profanity part of the deny set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfanitySource {
    /// `PINNED_PROFANITY`
    #[default]
    Pinned,
    /// Words supplied by the caller
    Inline(Vec<String>),
    /// JSON array of words fetched over HTTP
    Remote(String),
}

/// The set of denied words, lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenyList {
    words: HashSet<String>,
}

impl DenyList {
    /// Builds a deny set from `DENY_WORDS` plus the profanity `source`.
    ///
    /// A remote list that cannot be fetched falls back to the pinned list.
    pub async fn load(source: &ProfanitySource) -> Self {
        let profanity = match source {
            ProfanitySource::Pinned => pinned(),
            ProfanitySource::Inline(words) => words.clone(),
            ProfanitySource::Remote(url) => match fetch_words(url).await {
                Ok(words) => {
                    info!(url = %url, words = words.len(), "Fetched deny-list words");
                    words
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Falling back to pinned deny-list words");
                    pinned()
                }
            },
        };
        let profanity = profanity.iter().map(String::as_str);
        Self::from_words(DENY_WORDS.iter().copied().chain(profanity))
    }

    /// Builds a deny set from exactly `words`, minus `FALSE_POSITIVES`.
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let words = words
            .into_iter()
            .map(str::to_lowercase)
            .filter(|word| !word.is_empty() && !FALSE_POSITIVES.contains(&word.as_str()))
            .collect();
        Self { words }
    }

    /// Returns true if `word` is denied. Matching is case-insensitive.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of denied words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if nothing is denied.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whitespace-separated tokens of `content` containing a denied word.
    ///
    /// Tokens are split on `/` so hostnames inside URLs are found. Each part
    /// loses one leading and one trailing `.` or `:` before lookup.
    pub fn offending_tokens<'c>(&self, content: &'c str) -> BTreeSet<&'c str> {
        content
            .split_whitespace()
            .filter(|token| token.split('/').any(|part| self.contains(trim_part(part))))
            .collect()
    }

    /// Records a `DenyListWord` for each distinct offending token in `content`.
    ///
    /// Returns the number of new errors added.
    pub fn check(&self, file: &Path, content: &str, errors: &mut MetadataErrors) -> usize {
        let found = self.offending_tokens(content);
        if !found.is_empty() {
            debug!(file = %file.display(), tokens = found.len(), "Deny-listed words found");
        }
        errors.merge(found.into_iter().map(|word| MetadataError::DenyListWord {
            file: file.to_path_buf(),
            word: word.to_string(),
        }))
    }
}

fn pinned() -> Vec<String> {
    PINNED_PROFANITY.iter().map(|w| w.to_string()).collect()
}

fn trim_part(part: &str) -> &str {
    let part = part.strip_prefix(['.', ':']).unwrap_or(part);
    part.strip_suffix(['.', ':']).unwrap_or(part)
}

async fn fetch_words(url: &str) -> Result<Vec<String>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    serde_json::from_str(&body).map_err(ScanError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn deny_list() -> DenyList {
        DenyList::from_words(DENY_WORDS.iter().copied().chain(["darn", "kill"]))
    }

    #[test]
    fn test_url_host_is_found() {
        let mut errors = MetadataErrors::new();
        let content = "See the guide.\nVisit https://alpha-docs-aws.amazon.com/guide today.";

        deny_list().check(Path::new("README.md"), content, &mut errors);

        assert_eq!(
            errors.into_vec(),
            vec![MetadataError::DenyListWord {
                file: PathBuf::from("README.md"),
                word: "https://alpha-docs-aws.amazon.com/guide".to_string(),
            }]
        );
    }

    #[test]
    fn test_trims_one_punctuation_char() {
        let list = deny_list();

        assert!(!list.offending_tokens("Darn.").is_empty());
        assert!(!list.offending_tokens(":darn:").is_empty());
        assert!(list.offending_tokens("..darn").is_empty());
        assert!(list.offending_tokens("darned").is_empty());
    }

    #[test]
    fn test_token_reported_once_per_file() {
        let mut errors = MetadataErrors::new();

        let added = deny_list().check(Path::new("a.txt"), "darn darn darn", &mut errors);

        assert_eq!(added, 1);
    }

    #[test]
    fn test_false_positives_are_removed() {
        let list = deny_list();

        assert!(!list.contains("kill"));
        assert!(list.contains("DARN"));
    }

    #[tokio::test]
    async fn test_load_inline_source() {
        let list = DenyList::load(&ProfanitySource::Inline(vec!["Heck".to_string()])).await;

        assert!(list.contains("heck"));
        assert!(list.contains("integ-docs-aws.amazon.com"));
        assert_eq!(list.len(), DENY_WORDS.len() + 1);
    }

    #[tokio::test]
    async fn test_default_source_is_pinned() {
        let list = DenyList::load(&ProfanitySource::default()).await;

        assert_eq!(ProfanitySource::default(), ProfanitySource::Pinned);
        assert!(PINNED_PROFANITY.iter().all(|word| list.contains(word)));
        assert_eq!(list.len(), DENY_WORDS.len() + PINNED_PROFANITY.len());
    }

    #[tokio::test]
    async fn test_unreachable_remote_falls_back_to_pinned() {
        let source = ProfanitySource::Remote("http://127.0.0.1:9/words.json".to_string());

        let list = DenyList::load(&source).await;

        assert_eq!(list, DenyList::load(&ProfanitySource::Pinned).await);
    }
}
