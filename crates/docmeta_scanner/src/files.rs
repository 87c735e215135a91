//! Which files a scan looks at, and how they are read.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Source code extensions. These also get the SPDX header check.
pub const CODE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cs", "go", "h", "hpp", "java", "js", "kt", "kts", "mjs", "php", "ps1",
    "py", "rb", "rs", "scala", "sh", "swift", "ts",
];

/// Documentation and data extensions, scanned for content only.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "cfg", "html", "ini", "json", "md", "properties", "sql", "toml", "txt", "xml", "yaml", "yml",
];

/// File names never scanned.
pub const IGNORE_FILES: &[&str] = &[
    ".travis.yml",
    "AssemblyInfo.cs",
    "Cargo.lock",
    "go.sum",
    "package-lock.json",
    "yarn.lock",
];

/// Directories never descended into.
pub const IGNORE_DIRS: &[&str] = &[
    ".git",
    ".gradle",
    ".idea",
    ".venv",
    "__pycache__",
    "bin",
    "build",
    "dist",
    "node_modules",
    "obj",
    "target",
    "vendor",
    "venv",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Returns true for source code files.
pub fn is_code(path: &Path) -> bool {
    extension(path).is_some_and(|ext| CODE_EXTENSIONS.contains(&ext.as_str()))
}

/// Returns true if a scan should not look at `path`: the extension is not
/// recognized, or the file name is on the ignore list.
pub fn skip(path: &Path) -> bool {
    let ignored = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| IGNORE_FILES.contains(&name));
    let known = extension(path).is_some_and(|ext| {
        CODE_EXTENSIONS.contains(&ext.as_str()) || TEXT_EXTENSIONS.contains(&ext.as_str())
    });
    ignored || !known
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORE_DIRS.contains(&name))
}

/// Files under `root` that a scan should look at, in sorted traversal order.
pub fn scan_files(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && !skip(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Decodes file bytes as UTF-8, dropping a leading byte order mark.
///
/// Returns `None` for anything that is not valid UTF-8.
pub fn decode(mut bytes: Vec<u8>) -> Option<String> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes).ok()
}

/// Reads a file as UTF-8 text, tolerating a byte order mark.
pub fn read_text(path: &Path) -> Option<String> {
    std::fs::read(path).ok().and_then(decode)
}

/// `path` relative to `root`, or `path` itself when it is outside `root`.
pub fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
