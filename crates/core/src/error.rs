//! Error types for gcsb-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for gcsb-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gcsb-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service account could not be read or the client could not be built from it
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Bucket lookup failed
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Exact-match lookup returned nothing
    #[error("File not found: {0}")]
    ObjectNotFound(String),

    /// Source pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Listing or transfer call failed
    #[error("{operation} failed for {target}: {reason}")]
    BackendUnavailable {
        operation: &'static str,
        target: String,
        reason: String,
    },

    /// Copy succeeded but the source could not be deleted afterwards
    #[error(
        "Copied {source_object} to {destination} but failed to delete the source, \
         the object now exists in both locations: {reason}"
    )]
    IncompleteMove {
        source_object: String,
        destination: String,
        reason: String,
    },

    /// Two or more sources resolve to the same destination
    #[error(
        "{} sources would be written to {destination}: {}",
        .sources.len(),
        .sources.join(", ")
    )]
    DestinationConflict {
        destination: String,
        sources: Vec<String>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Shorthand for a failed backend call
    pub fn backend(
        operation: &'static str,
        target: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Error::BackendUnavailable {
            operation,
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidCredentials(_) => 200,
            Error::BucketNotFound(_) => 201,
            Error::BackendUnavailable { .. } | Error::IncompleteMove { .. } => 202,
            Error::ObjectNotFound(_) => 205,
            Error::InvalidPattern { .. } => 206,
            _ => 1,
        }
    }
}
