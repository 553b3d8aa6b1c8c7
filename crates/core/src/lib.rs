//! gcsb-core: Core library for the gcsb Google Cloud Storage CLI
//!
//! This crate provides the core functionality for gcsb, including:
//! - Configuration management
//! - Service account credential handling
//! - Destination path resolution
//! - Source matching (exact name or regular expression)
//! - ObjectStore trait for storage operations
//! - The operation driver shared by every command
//!
//! This crate is designed to be independent of any specific storage SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod config;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod matching;
pub mod path;
pub mod traits;

pub use config::{Config, ConfigManager, StorageSettings};
pub use credentials::{CredentialFile, CredentialSource, ServiceAccountKey};
pub use driver::{
    Action, ActionKind, Driver, Outcome, Reporter, Request, SilentReporter, Step, Summary, plan,
};
pub use error::{Error, Result};
pub use matching::{MatchMode, Pattern, SourceSpec, filter_matches};
pub use path::{DestinationSpec, ObjectRef};
pub use traits::{ObjectInfo, ObjectStore};
