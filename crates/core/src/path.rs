//! Path resolution
//!
//! Pure functions that turn a source path, a destination folder and an
//! optional destination file name into the final destination path.
//! Paths are always `/`-separated object-style paths; nothing here touches
//! the filesystem.

/// A reference to a stored object: bucket plus object name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Bucket name
    pub bucket: String,
    /// Object name (full path inside the bucket)
    pub path: String,
}

impl ObjectRef {
    /// Create a new ObjectRef
    pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.path)
    }
}

impl AsRef<str> for ObjectRef {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

/// Where the output of an operation should go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationSpec {
    /// Cleaned destination folder; empty means the bucket root or working directory
    pub folder: String,
    /// Explicit destination file name; `None` derives it from the source
    pub file_name: Option<String>,
}

impl DestinationSpec {
    /// Build a spec from raw user input
    ///
    /// The folder is cleaned and an empty file name counts as absent.
    pub fn new(folder: &str, file_name: Option<&str>) -> Self {
        Self {
            folder: clean_folder_name(folder),
            file_name: file_name.filter(|n| !n.is_empty()).map(str::to_string),
        }
    }

    /// Resolve the destination for one source
    pub fn resolve(&self, source_path: &str, match_index: Option<usize>) -> ResolvedPath {
        resolve_destination(
            &self.folder,
            self.file_name.as_deref(),
            source_path,
            match_index,
        )
    }
}

/// Final `folder/file_name` destination after cleaning and combining
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ResolvedPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<ResolvedPath> for String {
    fn from(path: ResolvedPath) -> Self {
        path.0
    }
}

/// Syntactic normalization of a `/`-separated path
///
/// Collapses repeated separators, drops `.` segments and resolves `..`
/// against the preceding segment. Leading `..` segments of a relative path
/// are kept, and `..` directly under the root is dropped. An empty result
/// becomes `"."`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&"..") => segments.push(".."),
                Some(_) => {
                    segments.pop();
                }
                None if !absolute => segments.push(".."),
                None => {}
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Strip leading and trailing separators and normalize what is left
///
/// An empty (or all-separator) name stays empty, meaning "no folder".
pub fn clean_folder_name(name: &str) -> String {
    let trimmed = name.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        normalize(trimmed)
    }
}

/// Join a folder and a file name into one normalized path
pub fn combine(folder: &str, file_name: &str) -> String {
    if folder.is_empty() {
        normalize(file_name)
    } else {
        normalize(&format!("{folder}/{file_name}"))
    }
}

/// Last segment of a path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Insert `_<n>` before the first `.` of a name, or append it when there is none
pub fn enumerate_name(name: &str, n: usize) -> String {
    match name.find('.') {
        Some(pos) => format!("{}_{n}{}", &name[..pos], &name[pos..]),
        None => format!("{name}_{n}"),
    }
}

/// Compute the destination path for a single source
///
/// - explicit name with an index: the name is enumerated with the index
/// - explicit name without an index: the name is used as-is
/// - no name: the source basename is used
///
/// The result is always combined with the cleaned destination folder.
pub fn resolve_destination(
    dest_folder: &str,
    dest_file_name: Option<&str>,
    source_path: &str,
    match_index: Option<usize>,
) -> ResolvedPath {
    let file_name = match (dest_file_name.filter(|n| !n.is_empty()), match_index) {
        (Some(name), Some(n)) => enumerate_name(name, n),
        (Some(name), None) => name.to_string(),
        (None, _) => basename(source_path).to_string(),
    };

    ResolvedPath(combine(&clean_folder_name(dest_folder), &file_name))
}
