//! Source matching
//!
//! Produces the ordered set of sources an operation runs against, either by
//! exact name or by filtering a listing with a regular expression. The
//! pattern is searched anywhere in the candidate's full path, so a pattern
//! meant for a folder-scoped listing sees the folder prefix too.

use std::path::Path;
use std::str::FromStr;

use regex::Regex;

use crate::error::{Error, Result};
use crate::path::{ObjectRef, clean_folder_name, combine};
use crate::traits::ObjectStore;

/// How the source file name is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The source names exactly one object
    #[default]
    Exact,
    /// The source is a pattern matched against a folder listing
    Regex,
}

impl MatchMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchMode::Exact => "exact_match",
            MatchMode::Regex => "regex_match",
        }
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact_match" => Ok(MatchMode::Exact),
            "regex_match" => Ok(MatchMode::Regex),
            other => Err(Error::General(format!(
                "Unknown match type '{other}'. Expected exact_match or regex_match"
            ))),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user asked to operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Cleaned source folder
    pub folder: String,
    /// Exact file name, or the pattern in regex mode
    pub file_name: String,
    /// Match mode
    pub mode: MatchMode,
}

impl SourceSpec {
    pub fn new(folder: &str, file_name: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            folder: clean_folder_name(folder),
            file_name: file_name.into(),
            mode,
        }
    }

    /// Full path of the source in exact mode
    pub fn full_path(&self) -> String {
        combine(&self.folder, &self.file_name)
    }

    /// Prefix used to scope a remote listing to the source folder
    pub fn listing_prefix(&self) -> String {
        if self.folder.is_empty() {
            String::new()
        } else {
            format!("{}/", self.folder)
        }
    }
}

/// A compiled source pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern, reporting failures as `InvalidPattern`
    pub fn compile(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Unanchored search against the whole path
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Keep the candidates that match, preserving their order
    pub fn filter<T: AsRef<str>>(&self, candidates: Vec<T>) -> Vec<T> {
        candidates
            .into_iter()
            .filter(|c| self.is_match(c.as_ref()))
            .collect()
    }
}

/// Compile `pattern` and keep the candidates whose path matches it
pub fn filter_matches<T: AsRef<str>>(candidates: Vec<T>, pattern: &str) -> Result<Vec<T>> {
    Ok(Pattern::compile(pattern)?.filter(candidates))
}

/// List the objects under a folder prefix with a single listing call
///
/// Directory placeholder objects (names ending in `/`) are skipped.
pub async fn list_candidates(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<ObjectRef>> {
    let objects = store.list(bucket, prefix).await?;
    tracing::debug!(bucket, prefix, count = objects.len(), "Listed candidates");

    Ok(objects
        .into_iter()
        .filter(|o| !o.path.is_empty() && !o.path.ends_with('/'))
        .collect())
}

/// List every regular file under `root/folder`, relative to `root`
///
/// Paths use `/` separators and are sorted so enumeration is stable. A missing folder
/// yields no candidates.
pub fn list_local_candidates(root: &Path, folder: &str) -> Result<Vec<String>> {
    let base = if folder.is_empty() {
        root.to_path_buf()
    } else {
        root.join(folder)
    };

    if !base.is_dir() {
        tracing::debug!(folder = %base.display(), "Source folder does not exist");
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&base.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|e| Error::General(e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::Io(e.into()))?;
        if !path.is_file() {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(relative);
    }
    files.sort();

    tracing::debug!(folder = %base.display(), count = files.len(), "Listed local candidates");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockObjectStore;
    use tempfile::TempDir;

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("exact_match".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!("regex_match".parse::<MatchMode>().unwrap(), MatchMode::Regex);
        assert!("glob_match".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::default(), MatchMode::Exact);
        assert_eq!(MatchMode::Regex.to_string(), "regex_match");
    }

    #[test]
    fn test_source_spec_paths() {
        let spec = SourceSpec::new("/in//daily/", "a.csv", MatchMode::Exact);
        assert_eq!(spec.folder, "in/daily");
        assert_eq!(spec.full_path(), "in/daily/a.csv");
        assert_eq!(spec.listing_prefix(), "in/daily/");

        let spec = SourceSpec::new("", "a.csv", MatchMode::Exact);
        assert_eq!(spec.full_path(), "a.csv");
        assert_eq!(spec.listing_prefix(), "");
    }

    #[test]
    fn test_filter_matches_preserves_order() {
        let candidates = vec!["in/b.csv", "in/a.txt", "in/c.csv", "in/a.csv"];
        let matched = filter_matches(candidates, r"\.csv$").unwrap();
        assert_eq!(matched, vec!["in/b.csv", "in/c.csv", "in/a.csv"]);
    }

    #[test]
    fn test_filter_matches_is_idempotent() {
        let candidates = vec!["x/report_1.csv", "x/notes.md", "x/report_2.csv"];
        let once = filter_matches(candidates, "report").unwrap();
        let twice = filter_matches(once.clone(), "report").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_matches_searches_full_path() {
        let candidates = vec![
            ObjectRef::new("b", "reports/2024/a.csv"),
            ObjectRef::new("b", "other/2024/b.csv"),
        ];
        let matched = filter_matches(candidates, "^reports/").unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].path, "reports/2024/a.csv");
    }

    #[test]
    fn test_filter_matches_invalid_pattern() {
        let result = filter_matches(vec!["a"], "(unclosed");
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPattern { pattern, .. } if pattern == "(unclosed"
        ));
    }

    #[tokio::test]
    async fn test_list_candidates_skips_placeholders() {
        let mut store = MockObjectStore::new();
        store
            .expect_list()
            .withf(|bucket, prefix| bucket == "b" && prefix == "in/")
            .times(1)
            .returning(|bucket, _| {
                Ok(vec![
                    ObjectRef::new(bucket, "in/"),
                    ObjectRef::new(bucket, "in/a.csv"),
                    ObjectRef::new(bucket, "in/sub/"),
                    ObjectRef::new(bucket, "in/sub/b.csv"),
                ])
            });

        let candidates = list_candidates(&store, "b", "in/").await.unwrap();
        let paths: Vec<_> = candidates.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["in/a.csv", "in/sub/b.csv"]);
    }

    #[tokio::test]
    async fn test_list_candidates_propagates_backend_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_list()
            .returning(|bucket, _| Err(Error::backend("list", bucket, "timeout")));

        let result = list_candidates(&store, "b", "").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::BackendUnavailable { .. }
        ));
    }

    #[test]
    fn test_list_local_candidates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("data/nested")).unwrap();
        std::fs::write(root.join("data/b.csv"), "b").unwrap();
        std::fs::write(root.join("data/a.csv"), "a").unwrap();
        std::fs::write(root.join("data/nested/c.csv"), "c").unwrap();
        std::fs::write(root.join("outside.csv"), "x").unwrap();

        let files = list_local_candidates(root, "data").unwrap();
        assert_eq!(
            files,
            vec!["data/a.csv", "data/b.csv", "data/nested/c.csv"]
        );
    }

    #[test]
    fn test_list_local_candidates_missing_folder() {
        let temp_dir = TempDir::new().unwrap();
        let files = list_local_candidates(temp_dir.path(), "nope").unwrap();
        assert!(files.is_empty());
    }
}
