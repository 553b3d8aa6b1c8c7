//! GCS client implementation
//!
//! Wraps OpenDAL's GCS service and implements the ObjectStore trait from gcsb-core.
//! An OpenDAL operator is bound to one bucket, so the client keeps one operator
//! per bucket it has touched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{ErrorKind, Metadata, Operator, services};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use gcsb_core::config::DEFAULT_UPLOAD_CHUNK_SIZE;
use gcsb_core::{Error, ObjectInfo, ObjectRef, ObjectStore, Result, ServiceAccountKey};

/// Size of each read during transfers
const READ_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Connection settings for the GCS client
#[derive(Debug, Clone)]
pub struct GcsConfig {
    /// Service account key file
    pub credential_path: PathBuf,

    /// Custom endpoint, e.g. a local emulator
    pub endpoint: Option<String>,

    /// Chunk size for resumable uploads
    pub upload_chunk_size: usize,
}

impl GcsConfig {
    pub fn new(credential_path: impl Into<PathBuf>) -> Self {
        Self {
            credential_path: credential_path.into(),
            endpoint: None,
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }
}

/// GCS client wrapper
pub struct GcsClient {
    config: GcsConfig,
    operators: Mutex<HashMap<String, Operator>>,
}

impl GcsClient {
    /// Create a new client after validating the service account key
    pub fn new(config: GcsConfig) -> Result<Self> {
        let key = ServiceAccountKey::load(&config.credential_path)?;
        tracing::debug!(
            key_type = %key.key_type,
            project = ?key.project_id,
            endpoint = ?config.endpoint,
            "Loaded service account key"
        );

        Ok(Self {
            config,
            operators: Mutex::new(HashMap::new()),
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &GcsConfig {
        &self.config
    }

    /// Operator bound to `bucket`, created on first use
    fn operator(&self, bucket: &str) -> Result<Operator> {
        let mut operators = self
            .operators
            .lock()
            .map_err(|_| Error::General("GCS operator cache lock poisoned".into()))?;

        if let Some(op) = operators.get(bucket) {
            return Ok(op.clone());
        }

        let credential_path = self.config.credential_path.to_string_lossy();
        let mut builder = services::Gcs::default()
            .bucket(bucket)
            .credential_path(&credential_path);

        if let Some(ref endpoint) = self.config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        let op = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| map_bucket_error("connect", bucket, e))?;

        tracing::debug!(bucket, "Created GCS operator");
        operators.insert(bucket.to_string(), op.clone());
        Ok(op)
    }

    async fn upload_file(&self, op: &Operator, local_path: &Path, object: &ObjectRef) -> Result<u64> {
        let mut file = tokio::fs::File::open(local_path).await?;
        let content_type = content_type_for(local_path);

        let mut writer = op
            .writer_with(&object.path)
            .chunk(self.config.upload_chunk_size)
            .content_type(&content_type)
            .await
            .map_err(|e| map_error("upload", object.to_string(), e))?;

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut written = 0u64;
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            writer
                .write(buf[..n].to_vec())
                .await
                .map_err(|e| map_error("upload", object.to_string(), e))?;
            written += n as u64;
        }

        writer
            .close()
            .await
            .map_err(|e| map_error("upload", object.to_string(), e))?;

        Ok(written)
    }

    /// Stream an object into a local file without buffering it whole
    async fn download_file(
        &self,
        op: &Operator,
        object: &ObjectRef,
        local_path: &Path,
    ) -> Result<u64> {
        let mut stream = op
            .reader_with(&object.path)
            .chunk(READ_BUFFER_SIZE)
            .await
            .map_err(|e| map_error("download", object.to_string(), e))?
            .into_bytes_stream(..)
            .await
            .map_err(|e| map_error("download", object.to_string(), e))?;

        let mut file = tokio::fs::File::create(local_path).await?;
        let mut written = 0u64;
        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| Error::backend("download", object.to_string(), e))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    /// Copy between buckets by streaming through the client
    async fn copy_across(&self, source: &ObjectRef, destination: &ObjectRef) -> Result<()> {
        let source_op = self.operator(&source.bucket)?;
        let destination_op = self.operator(&destination.bucket)?;

        let meta = source_op
            .stat(&source.path)
            .await
            .map_err(|e| map_error("copy", source.to_string(), e))?;
        let mut stream = source_op
            .reader_with(&source.path)
            .chunk(READ_BUFFER_SIZE)
            .await
            .map_err(|e| map_error("copy", source.to_string(), e))?
            .into_bytes_stream(..)
            .await
            .map_err(|e| map_error("copy", source.to_string(), e))?;

        let mut write = destination_op
            .writer_with(&destination.path)
            .chunk(self.config.upload_chunk_size);
        if let Some(content_type) = meta.content_type() {
            write = write.content_type(content_type);
        }
        let mut writer = write
            .await
            .map_err(|e| map_error("copy", destination.to_string(), e))?;

        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| Error::backend("copy", source.to_string(), e))?
        {
            writer
                .write(chunk)
                .await
                .map_err(|e| map_error("copy", destination.to_string(), e))?;
        }
        writer
            .close()
            .await
            .map_err(|e| map_error("copy", destination.to_string(), e))?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let op = self.operator(bucket)?;
        let lookup = async {
            let mut lister = op.lister_with("/").limit(1).await?;
            lister.try_next().await
        };

        match lookup.await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_bucket_error("bucket lookup", bucket, e)),
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>> {
        let op = self.operator(bucket)?;
        let entries: Vec<_> = op
            .lister_with(prefix)
            .recursive(true)
            .await
            .map_err(|e| map_bucket_error("list", bucket, e))?
            .try_collect()
            .await
            .map_err(|e| map_bucket_error("list", bucket, e))?;

        Ok(entries
            .into_iter()
            .filter(|entry| !entry.metadata().is_dir())
            .map(|entry| ObjectRef::new(bucket, entry.path()))
            .collect())
    }

    async fn get(&self, object: &ObjectRef) -> Result<Option<ObjectInfo>> {
        let op = self.operator(&object.bucket)?;
        match op.stat(&object.path).await {
            Ok(meta) if meta.is_dir() => Ok(None),
            Ok(meta) => Ok(Some(object_info(&object.path, &meta))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_error("stat", object.to_string(), e)),
        }
    }

    async fn fetch(&self, object: &ObjectRef, local_path: &Path) -> Result<ObjectInfo> {
        let op = self.operator(&object.bucket)?;
        tracing::debug!(object = %object, path = %local_path.display(), "Downloading object");

        let size = self.download_file(&op, object, local_path).await?;

        tracing::debug!(object = %object, size, "Download complete");
        Ok(ObjectInfo::file(&object.path, size))
    }

    async fn put(&self, local_path: &Path, object: &ObjectRef) -> Result<ObjectInfo> {
        let op = self.operator(&object.bucket)?;
        tracing::debug!(
            path = %local_path.display(),
            object = %object,
            chunk_size = self.config.upload_chunk_size,
            "Uploading file"
        );

        let size = self.upload_file(&op, local_path, object).await?;

        tracing::debug!(object = %object, size, "Upload complete");
        let mut info = ObjectInfo::file(&object.path, size);
        info.content_type = Some(content_type_for(local_path));
        Ok(info)
    }

    async fn copy(&self, source: &ObjectRef, destination: &ObjectRef) -> Result<()> {
        tracing::debug!(source = %source, destination = %destination, "Copying object");

        // Operators are bucket-scoped, so a cross-bucket copy goes through the client
        if source.bucket != destination.bucket {
            return self.copy_across(source, destination).await;
        }

        self.operator(&source.bucket)?
            .copy(&source.path, &destination.path)
            .await
            .map_err(|e| map_error("copy", source.to_string(), e))
    }

    async fn remove(&self, object: &ObjectRef) -> Result<()> {
        let op = self.operator(&object.bucket)?;
        tracing::debug!(object = %object, "Deleting object");

        op.delete(&object.path)
            .await
            .map_err(|e| map_error("delete", object.to_string(), e))
    }
}

/// Translate an OpenDAL error into the gcsb taxonomy
fn map_error(operation: &'static str, target: impl Into<String>, e: opendal::Error) -> Error {
    let target = target.into();
    match e.kind() {
        ErrorKind::NotFound => Error::ObjectNotFound(target),
        ErrorKind::PermissionDenied | ErrorKind::ConfigInvalid => {
            Error::InvalidCredentials(format!("{operation} {target}: {e}"))
        }
        _ => Error::backend(operation, target, e),
    }
}

/// Like [`map_error`], but a missing target on a bucket-level call is the bucket
fn map_bucket_error(operation: &'static str, bucket: &str, e: opendal::Error) -> Error {
    match e.kind() {
        ErrorKind::NotFound => Error::BucketNotFound(bucket.to_string()),
        _ => map_error(operation, bucket, e),
    }
}

fn object_info(path: &str, meta: &Metadata) -> ObjectInfo {
    let mut info = ObjectInfo::file(path, meta.content_length());
    info.last_modified = meta
        .last_modified()
        .and_then(|dt| jiff::Timestamp::from_second(dt.timestamp()).ok());
    info.etag = meta.etag().map(|s| s.trim_matches('"').to_string());
    info.content_type = meta.content_type().map(|s| s.to_string());
    info
}

fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}
