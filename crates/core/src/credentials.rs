//! Service account credentials
//!
//! The `--service-account` value is either an inline JSON key or a path to a
//! key file. Inline keys are written to a temporary file that lives exactly
//! as long as the returned [`CredentialFile`] guard. The resulting path is
//! handed to the storage client explicitly; no environment variable is set.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Where the credentials come from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// JSON key content given directly on the command line
    Inline(String),
    /// Path to an existing key file
    Path(PathBuf),
}

impl CredentialSource {
    /// Interpret a `--service-account` value
    ///
    /// Anything that parses as JSON is inline content, everything else is a path.
    pub fn from_arg(value: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(value) {
            Ok(_) => CredentialSource::Inline(value.to_string()),
            Err(_) => CredentialSource::Path(PathBuf::from(value)),
        }
    }

    /// Produce a key file on disk for the storage client to read
    pub fn materialize(self) -> Result<CredentialFile> {
        match self {
            CredentialSource::Inline(content) => CredentialFile::temporary(&content),
            CredentialSource::Path(path) => {
                tracing::info!(path = %path.display(), "Using specified json credentials file");
                Ok(CredentialFile { path, temp: None })
            }
        }
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline(<redacted>)"),
            CredentialSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

/// A credential file on disk
///
/// When created from inline content the file is temporary and removed on drop,
/// which covers success, error and unwinding exits alike.
#[derive(Debug)]
pub struct CredentialFile {
    path: PathBuf,
    temp: Option<tempfile::TempPath>,
}

impl CredentialFile {
    fn temporary(content: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("gcsb-credentials-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let temp = file.into_temp_path();
        let path = temp.to_path_buf();
        tracing::info!(path = %path.display(), "Storing json credentials temporarily");

        Ok(Self {
            path,
            temp: Some(temp),
        })
    }

    /// Path of the key file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is removed when this guard is dropped
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Read and validate the key file
    pub fn key(&self) -> Result<ServiceAccountKey> {
        ServiceAccountKey::load(&self.path)
    }
}

impl Drop for CredentialFile {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            tracing::info!(path = %self.path.display(), "Removing temporary credentials file");
            if let Err(e) = temp.close() {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temporary credentials file");
            }
        }
    }
}

/// The fields of a Google credentials file that gcsb cares about
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Credential type, usually `service_account`
    #[serde(rename = "type")]
    pub key_type: String,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub client_email: Option<String>,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub private_key_id: Option<String>,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Load a key file, reporting every problem as `InvalidCredentials`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidCredentials(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse key file content
    pub fn parse(content: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(content)
            .map_err(|e| Error::InvalidCredentials(format!("malformed credentials JSON: {e}")))?;

        if key.key_type == "service_account"
            && (key.client_email.is_none() || key.private_key.is_none())
        {
            return Err(Error::InvalidCredentials(
                "service account key is missing client_email or private_key".into(),
            ));
        }

        Ok(key)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
