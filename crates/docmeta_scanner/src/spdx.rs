//! License header check for source files.

use crate::files::is_code;
use docmeta_core::{MetadataError, MetadataErrors};
use std::path::Path;

/// Lines searched for the header, not counting a shebang.
pub const HEADER_LINES: usize = 5;

const SPDX_MARKER: &str = "SPDX-License-Identifier:";
const COPYRIGHT_MARKER: &str = "Copyright";

/// Checks that a source file opens with a copyright line and an SPDX
/// identifier. Non-code files and empty files are not checked.
///
/// Returns the number of new errors added.
pub fn check(file: &Path, content: &str, errors: &mut MetadataErrors) -> usize {
    if !is_code(file) || content.trim().is_empty() {
        return 0;
    }

    let mut lines = content.lines().peekable();
    if lines.peek().is_some_and(|line| line.starts_with("#!")) {
        lines.next();
    }
    let header: Vec<&str> = lines.take(HEADER_LINES).collect();

    let mut found = Vec::new();
    if !header.iter().any(|line| line.contains(COPYRIGHT_MARKER)) {
        found.push(MetadataError::MissingCopyright {
            file: file.to_path_buf(),
        });
    }
    if !header.iter().any(|line| line.contains(SPDX_MARKER)) {
        found.push(MetadataError::MissingSpdxHeader {
            file: file.to_path_buf(),
        });
    }
    errors.merge(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const HEADER: &str =
        "# Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.\n# SPDX-License-Identifier: Apache-2.0\n";

    fn run(file: &str, content: &str) -> Vec<MetadataError> {
        let mut errors = MetadataErrors::new();
        check(Path::new(file), content, &mut errors);
        errors.into_vec()
    }

    #[test]
    fn test_header_present() {
        assert!(run("app.py", &format!("{}\nimport boto3\n", HEADER)).is_empty());
    }

    #[test]
    fn test_shebang_is_skipped() {
        let content = format!("#!/usr/bin/env python3\n\n\n\n{}", HEADER);

        assert!(run("app.py", &content).is_empty());
    }

    #[test]
    fn test_header_too_far_down() {
        let content = format!("\n\n\n\n\n{}", HEADER);

        assert_eq!(
            run("app.py", &content),
            vec![
                MetadataError::MissingCopyright {
                    file: PathBuf::from("app.py")
                },
                MetadataError::MissingSpdxHeader {
                    file: PathBuf::from("app.py")
                },
            ]
        );
    }

    #[test]
    fn test_missing_spdx_only() {
        assert_eq!(
            run("Main.java", "// Copyright 2024 Example Corp.\nclass Main {}\n"),
            vec![MetadataError::MissingSpdxHeader {
                file: PathBuf::from("Main.java")
            }]
        );
    }

    #[test]
    fn test_docs_and_empty_files_are_skipped() {
        assert!(run("README.md", "# Title\n").is_empty());
        assert!(run("__init__.py", "\n").is_empty());
    }
}
