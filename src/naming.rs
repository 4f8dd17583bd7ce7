//! Resolving observation names to files on disk.
//!
//! A [`FileQuery`] is either a literal path or a pattern searched over a
//! subtree. Literal queries are a single `stat`; pattern queries walk the
//! subtree recursively, which is strictly slower — the timed-wait strategy
//! refuses them for that reason.
//!
//! Flag files live here too: presence/size classification and content
//! reading, shared by the flag-quorum strategy.

use std::{fs, path::Path, path::PathBuf};

use ignore::WalkBuilder;
use regex::Regex;

use crate::error::{AcquireError, Result};

/// How to find one subsystem's raw file(s) for an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileQuery {
    /// A single expected path; existence is one `stat`.
    Literal(PathBuf),

    /// A basename regex searched recursively below `root`, for instruments
    /// whose files are scattered across per-subsystem subdirectories.
    Pattern { root: PathBuf, pattern: String },
}

impl FileQuery {
    /// All files currently matching the query, sorted lexically.
    ///
    /// An empty result means "not there yet", not an error.
    pub fn locate(&self) -> Result<Vec<PathBuf>> {
        match self {
            Self::Literal(path) => {
                if path.is_file() {
                    Ok(vec![path.clone()])
                } else {
                    Ok(Vec::new())
                }
            }
            Self::Pattern { root, pattern } => {
                let regex = Regex::new(pattern).map_err(|e| AcquireError::BadPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
                Ok(search_subtree(root, &regex))
            }
        }
    }

    /// True if the query resolves to at least one file right now.
    pub fn exists(&self) -> Result<bool> {
        Ok(!self.locate()?.is_empty())
    }
}

/// Walk `root` and collect every file whose basename matches `regex`.
///
/// Raw-data trees are not source trees: gitignore handling is off and
/// dotfiles are visible (flag files are hidden files).
fn search_subtree(root: &Path, regex: &Regex) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(std::cmp::Ord::cmp)
        .build();

    let mut matches: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| regex.is_match(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .collect();

    matches.sort();
    matches
}

/// Joint state of an observation's flag-file quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumState {
    /// At least one flag file is missing.
    Missing,

    /// All present, but at least one is zero bytes: the observation has
    /// started and is not yet validated.
    Empty,

    /// All present with non-zero size.
    Ready,
}

/// Classify the quorum of flag files for one observation.
pub fn quorum_state(flags: &[PathBuf]) -> QuorumState {
    let mut any_empty = false;
    for flag in flags {
        match fs::metadata(flag) {
            Ok(meta) if meta.is_file() => {
                if meta.len() == 0 {
                    any_empty = true;
                }
            }
            _ => return QuorumState::Missing,
        }
    }
    if any_empty {
        QuorumState::Empty
    } else {
        QuorumState::Ready
    }
}

/// Read a flag file's newline-delimited raw filenames.
///
/// Blank and whitespace-only lines are ignored; a flag that cannot be read
/// as UTF-8 is malformed, not missing.
pub fn read_flag_lines(flag: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(flag)?;
    let text = String::from_utf8(bytes).map_err(|e| AcquireError::MalformedFlag {
        path: flag.to_path_buf(),
        reason: format!("not valid UTF-8: {e}"),
    })?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn literal_query_is_a_stat() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f20260806_00001.sdf");

        let query = FileQuery::Literal(path.clone());
        assert!(query.locate().unwrap().is_empty());

        fs::write(&path, b"data").unwrap();
        assert_eq!(query.locate().unwrap(), vec![path]);
    }

    #[test]
    fn pattern_query_searches_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ccd1")).unwrap();
        fs::create_dir(dir.path().join("ccd2")).unwrap();
        fs::write(dir.path().join("ccd1/f20260806_00007_1.sdf"), b"x").unwrap();
        fs::write(dir.path().join("ccd2/f20260806_00007_2.sdf"), b"x").unwrap();
        fs::write(dir.path().join("ccd2/f20260806_00008_1.sdf"), b"x").unwrap();

        let query = FileQuery::Pattern {
            root: dir.path().to_path_buf(),
            pattern: r"^f20260806_00007(_\d+)?\.sdf$".to_string(),
        };

        let found = query.locate().unwrap();
        assert_eq!(found.len(), 2);
        // Lexical order is part of the contract.
        assert!(found[0].ends_with("ccd1/f20260806_00007_1.sdf"));
        assert!(found[1].ends_with("ccd2/f20260806_00007_2.sdf"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let query = FileQuery::Pattern {
            root: PathBuf::from("/tmp"),
            pattern: "([".to_string(),
        };
        assert!(matches!(
            query.locate().unwrap_err(),
            AcquireError::BadPattern { .. }
        ));
    }

    #[test]
    fn quorum_classification() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join(".fa.ok");
        let b = dir.path().join(".fb.ok");

        assert_eq!(quorum_state(&[a.clone(), b.clone()]), QuorumState::Missing);

        fs::write(&a, b"").unwrap();
        assert_eq!(quorum_state(&[a.clone(), b.clone()]), QuorumState::Missing);

        fs::write(&b, b"f1.sdf\n").unwrap();
        // One empty member keeps the whole quorum unvalidated.
        assert_eq!(quorum_state(&[a.clone(), b.clone()]), QuorumState::Empty);

        fs::write(&a, b"f0.sdf\n").unwrap();
        assert_eq!(quorum_state(&[a, b]), QuorumState::Ready);
    }

    #[test]
    fn flag_lines_skip_blanks() {
        let dir = TempDir::new().unwrap();
        let flag = dir.path().join(".f.ok");
        fs::write(&flag, "a.sdf\n\n  \nb.sdf\n").unwrap();
        assert_eq!(read_flag_lines(&flag).unwrap(), ["a.sdf", "b.sdf"]);
    }
}
