//! Detection of snippet tags reused across files.
//!
//! Snippet tags have been written several ways over the years. Each convention
//! is one entry in `TAG_PATTERNS`; the first pattern matching a line wins.

use crate::files::{decode, is_code, relative, scan_files};
use crate::{Result, SnippetError};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Default number of concurrent file reads.
pub const DEFAULT_WORKERS: usize = 10;

/// The tag convention a pattern recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// `snippet-start:[tag]`
    Start,
    /// `snippet-end:[tag]`
    End,
    /// `SNIPPET START [tag]` / `SNIPPET END [tag]`
    Block,
    /// `// snippet-start: tag`
    SlashComment,
    /// `# snippet-start: tag`
    HashComment,
    /// `<!-- snippet-start: tag -->`
    HtmlComment,
    /// `snippet:tag`, `snippet-tag`, `snippet_tag`
    Generic,
}

/// Tag conventions, in match order. Each pattern captures the tag name.
pub const TAG_PATTERNS: &[(&str, TagKind)] = &[
    (r"snippet-start:\[([^\]]+)\]", TagKind::Start),
    (r"snippet-end:\[([^\]]+)\]", TagKind::End),
    (r"SNIPPET[ _-]START\s*\[([^\]]+)\]", TagKind::Block),
    (r"SNIPPET[ _-]END\s*\[([^\]]+)\]", TagKind::Block),
    (r"//\s*snippet-(?:start|end)\s*:\s*([\w.\-]+)", TagKind::SlashComment),
    (r"#\s*snippet-(?:start|end)\s*:\s*([\w.\-]+)", TagKind::HashComment),
    (
        r"<!--\s*snippet-(?:start|end)\s*:?\s*\[?([\w.\-]+)\]?\s*-->",
        TagKind::HtmlComment,
    ),
    (r"snippet[:\-_]([\w.\-]+)", TagKind::Generic),
];

static COMPILED_PATTERNS: LazyLock<Vec<(Regex, TagKind)>> = LazyLock::new(|| {
    TAG_PATTERNS
        .iter()
        .map(|(pattern, kind)| {
            let regex = Regex::new(&format!("(?i){}", pattern)).expect("valid");
            (regex, *kind)
        })
        .collect()
});

/// Tag on a single line, using the first convention that matches.
///
/// The generic convention ignores the bare words `start` and `end`.
pub fn match_line(line: &str) -> Option<(String, TagKind)> {
    for (regex, kind) in COMPILED_PATTERNS.iter() {
        let Some(tag) = regex.captures(line).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let tag = tag.as_str().trim();
        if *kind == TagKind::Generic
            && (tag.eq_ignore_ascii_case("start") || tag.eq_ignore_ascii_case("end"))
        {
            continue;
        }
        return Some((tag.to_string(), *kind));
    }
    None
}

/// One occurrence of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLocation {
    /// File, relative to the scanned root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The trimmed line
    pub context: String,
    /// Convention the tag was written in
    pub kind: TagKind,
}

/// Every tag occurrence in `content`, in line order.
pub fn extract_tags(file: &Path, content: &str) -> Vec<(String, TagLocation)> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let (tag, kind) = match_line(line)?;
            let location = TagLocation {
                file: file.to_path_buf(),
                line: index + 1,
                context: line.trim().to_string(),
                kind,
            };
            Some((tag, location))
        })
        .collect()
}

/// Tag name to every place it occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<TagLocation>>,
    files_scanned: usize,
}

impl TagIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the tags found in one file.
    pub fn add_file(&mut self, tags: Vec<(String, TagLocation)>) {
        for (tag, location) in tags {
            self.tags.entry(tag).or_default().push(location);
        }
        self.files_scanned += 1;
    }

    /// Occurrences of `tag`.
    pub fn locations(&self, tag: &str) -> &[TagLocation] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Distinct tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Number of files that contributed to the index.
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Tags found in two or more distinct files.
    pub fn duplicates(&self) -> DuplicateReport {
        let mut duplicates = BTreeMap::new();
        for (tag, locations) in &self.tags {
            let mut by_file: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
            for location in locations {
                by_file
                    .entry(location.file.clone())
                    .or_default()
                    .push(location.line);
            }
            if by_file.len() > 1 {
                for lines in by_file.values_mut() {
                    lines.sort_unstable();
                }
                duplicates.insert(tag.clone(), by_file);
            }
        }
        DuplicateReport { duplicates }
    }
}

/// Tags used in more than one file, grouped by tag, then file, then line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    /// Tag to file to line numbers
    pub duplicates: BTreeMap<String, BTreeMap<PathBuf, Vec<usize>>>,
}

impl DuplicateReport {
    /// Number of duplicated tags.
    pub fn len(&self) -> usize {
        self.duplicates.len()
    }

    /// Returns true if no tag is duplicated.
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }

    /// `Ok(true)` when there are no duplicates. Otherwise `Ok(false)`, or an
    /// error in strict mode.
    pub fn check(&self, strict: bool) -> std::result::Result<bool, SnippetError> {
        if self.is_empty() {
            Ok(true)
        } else if strict {
            Err(SnippetError::DuplicateTags { count: self.len() })
        } else {
            Ok(false)
        }
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No duplicate snippet tags found.");
        }
        writeln!(f, "Found {} duplicate snippet tag(s):", self.len())?;
        for (tag, files) in &self.duplicates {
            writeln!(f)?;
            writeln!(f, "  {}", tag)?;
            for (file, lines) in files {
                let label = if lines.len() == 1 { "line" } else { "lines" };
                let lines: Vec<String> = lines.iter().map(usize::to_string).collect();
                writeln!(f, "    {}: {} {}", file.display(), label, lines.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Finds snippet tags across a source tree with a bounded pool of readers.
///
/// # Example
///
/// ```rust,no_run
/// use docmeta_scanner::DuplicateDetector;
/// use std::path::Path;
///
/// # async fn run() -> docmeta_scanner::Result<()> {
/// let index = DuplicateDetector::new().scan(Path::new(".")).await?;
/// let report = index.duplicates();
///
/// print!("{}", report);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    workers: usize,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl DuplicateDetector {
    /// Creates a detector with `DEFAULT_WORKERS` readers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of concurrent file reads. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Number of concurrent file reads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Indexes every tag in the source files under `root`.
    ///
    /// Files that cannot be read are logged and left out of the index.
    pub async fn scan(&self, root: &Path) -> Result<TagIndex> {
        let files: Vec<PathBuf> = scan_files(root)?
            .into_iter()
            .filter(|path| is_code(path))
            .collect();
        info!(files = files.len(), workers = self.workers, "Scanning for snippet tags");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut read_set = JoinSet::new();
        for path in files {
            let file = relative(root, &path);
            let semaphore = semaphore.clone();
            read_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let content = tokio::fs::read(&path).await.map(decode);
                (file, content)
            });
        }

        let mut index = TagIndex::new();
        while let Some(result) = read_set.join_next().await {
            match result {
                Ok((file, Ok(Some(content)))) => {
                    let tags = extract_tags(&file, &content);
                    debug!(file = %file.display(), tags = tags.len(), "Scanned file");
                    index.add_file(tags);
                }
                Ok((file, Ok(None))) => {
                    warn!(file = %file.display(), "Skipping file that is not UTF-8");
                }
                Ok((file, Err(e))) => {
                    warn!(file = %file.display(), error = %e, "Failed to read file");
                }
                Err(e) => {
                    warn!(error = %e, "File read task panicked");
                }
            }
        }

        info!(
            files = index.files_scanned(),
            tags = index.tags.len(),
            "Snippet tag scan complete"
        );
        Ok(index)
    }
}
