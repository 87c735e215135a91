//! Balance check for `snippet-start` / `snippet-end` markers within a file.

use docmeta_core::{MetadataError, MetadataErrors};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static SNIPPET_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"snippet-start:\[([^\]]+)\]").expect("valid"));

static SNIPPET_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"snippet-end:\[([^\]]+)\]").expect("valid"));

fn tags<'c>(pattern: &Regex, content: &'c str) -> Vec<&'c str> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Records every start tag without an end tag and every end tag without a
/// start tag, in order of appearance.
///
/// Returns the number of new errors added.
pub fn check(file: &Path, content: &str, errors: &mut MetadataErrors) -> usize {
    let starts = tags(&SNIPPET_START, content);
    let ends = tags(&SNIPPET_END, content);
    let start_set: HashSet<&str> = starts.iter().copied().collect();
    let end_set: HashSet<&str> = ends.iter().copied().collect();

    let unmatched_starts = starts
        .iter()
        .filter(|tag| !end_set.contains(*tag))
        .map(|tag| MetadataError::UnmatchedSnippetStart {
            file: file.to_path_buf(),
            tag: tag.to_string(),
        });
    let unmatched_ends = ends
        .iter()
        .filter(|tag| !start_set.contains(*tag))
        .map(|tag| MetadataError::UnmatchedSnippetEnd {
            file: file.to_path_buf(),
            tag: tag.to_string(),
        });

    errors.merge(unmatched_starts.chain(unmatched_ends))
}
