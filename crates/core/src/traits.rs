//! ObjectStore trait definition
//!
//! This trait defines the small capability interface the operation driver
//! needs from a storage backend. It allows the CLI to be decoupled from the
//! specific storage SDK implementation.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::ObjectRef;

/// Metadata for a stored object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object name
    pub key: String,

    /// Size in bytes
    pub size_bytes: u64,

    /// Human-readable size
    pub size_human: String,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<jiff::Timestamp>,

    /// ETag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for an object of the given size
    pub fn file(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size_bytes: size,
            size_human: humansize::format_size(size, humansize::BINARY),
            last_modified: None,
            etag: None,
            content_type: None,
        }
    }
}

/// Trait for the storage operations used by gcsb commands
///
/// Each command uses only the subset it needs: download uses `fetch`,
/// upload uses `put`, move uses `copy` then `remove`, delete uses `remove`.
/// Exact-match lookups use `get`, regex matching uses `list`.
///
/// This trait is implemented by the GCS adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check if a bucket exists and is reachable with the configured credentials
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// List every object whose name starts with `prefix`, in listing order
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>>;

    /// Look up a single object by name
    async fn get(&self, object: &ObjectRef) -> Result<Option<ObjectInfo>>;

    /// Download an object into a local file
    async fn fetch(&self, object: &ObjectRef, local_path: &Path) -> Result<ObjectInfo>;

    /// Upload a local file to an object
    async fn put(&self, local_path: &Path, object: &ObjectRef) -> Result<ObjectInfo>;

    /// Server-side copy, possibly across buckets
    async fn copy(&self, source: &ObjectRef, destination: &ObjectRef) -> Result<()>;

    /// Delete an object
    async fn remove(&self, object: &ObjectRef) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_info_file() {
        let info = ObjectInfo::file("test.txt", 1024);
        assert_eq!(info.key, "test.txt");
        assert_eq!(info.size_bytes, 1024);
        assert_eq!(info.size_human, "1 KiB");
        assert!(info.etag.is_none());
    }

    #[test]
    fn test_object_info_serialization_skips_empty_fields() {
        let info = ObjectInfo::file("a.csv", 3);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["key"], "a.csv");
        assert_eq!(json["size_bytes"], 3);
        assert!(json.get("etag").is_none());
        assert!(json.get("last_modified").is_none());
    }
}
