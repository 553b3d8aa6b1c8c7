//! Configuration management
//!
//! This module handles loading and migrating the gcsb configuration file.
//! The configuration file is stored in TOML format at ~/.config/gcsb/config.toml.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
///
/// IMPORTANT: Bumping this version requires:
/// 1. Adding a migration in `ConfigManager::migrate`
/// 2. Updating migration tests
/// 3. Marking the change as BREAKING
pub const SCHEMA_VERSION: u32 = 1;

/// Default upload chunk size: 128 MiB
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 128 * 1024 * 1024;

/// Resumable uploads send chunks in multiples of 256 KiB
pub const UPLOAD_CHUNK_GRANULARITY: usize = 256 * 1024;

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default color setting
const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinners
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Settings passed to the storage client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Custom endpoint, e.g. a local emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Upload chunk size in bytes
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

fn default_upload_chunk_size() -> usize {
    DEFAULT_UPLOAD_CHUNK_SIZE
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            upload_chunk_size: default_upload_chunk_size(),
        }
    }
}

impl StorageSettings {
    /// Chunk size rounded down to the upload granularity, never below one unit
    pub fn effective_chunk_size(&self) -> usize {
        let rounded = self.upload_chunk_size - self.upload_chunk_size % UPLOAD_CHUNK_GRANULARITY;
        rounded.max(UPLOAD_CHUNK_GRANULARITY)
    }

    /// Validated endpoint, if one is configured
    pub fn endpoint_url(&self) -> Result<Option<url::Url>> {
        self.endpoint
            .as_deref()
            .map(url::Url::parse)
            .transpose()
            .map_err(Error::from)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            storage: StorageSettings::default(),
        }
    }
}

/// Configuration manager handles locating and loading config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(Self::in_dir(config_dir.join("gcsb")))
    }

    /// Create a ConfigManager reading `config.toml` from a specific directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_path: dir.into().join("config.toml"),
        }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Check schema version and migrate if necessary
        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade gcsb.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        config.storage.endpoint_url()?;

        Ok(config)
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;

        tracing::debug!(
            from = config.schema_version,
            to = SCHEMA_VERSION,
            "Migrating configuration"
        );

        // Add migration logic here when schema version is bumped

        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::in_dir(temp_dir.path());
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.defaults.output, "human");
        assert_eq!(config.defaults.color, "auto");
        assert!(config.defaults.progress);
        assert!(config.storage.endpoint.is_none());
        assert_eq!(config.storage.upload_chunk_size, DEFAULT_UPLOAD_CHUNK_SIZE);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_load_storage_settings() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path(),
            r#"
            schema_version = 1

            [defaults]
            output = "json"

            [storage]
            endpoint = "http://localhost:4443"
            upload_chunk_size = 1048576
            "#,
        )
        .unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.defaults.output, "json");
        assert!(config.defaults.progress);
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("http://localhost:4443")
        );
        assert_eq!(config.storage.effective_chunk_size(), 1024 * 1024);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path(),
            "schema_version = 1\n[storage]\nendpoint = \"not a url\"\n",
        )
        .unwrap();

        assert!(matches!(manager.load().unwrap_err(), Error::InvalidUrl(_)));
    }

    #[test]
    fn test_effective_chunk_size_rounding() {
        let settings = StorageSettings {
            endpoint: None,
            upload_chunk_size: UPLOAD_CHUNK_GRANULARITY * 3 + 17,
        };
        assert_eq!(settings.effective_chunk_size(), UPLOAD_CHUNK_GRANULARITY * 3);

        let settings = StorageSettings {
            endpoint: None,
            upload_chunk_size: 10,
        };
        assert_eq!(settings.effective_chunk_size(), UPLOAD_CHUNK_GRANULARITY);
    }

    #[test]
    fn test_older_schema_migrated() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(manager.config_path(), "schema_version = 0\n").unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();

        let content = format!(
            r#"
            schema_version = {}
            "#,
            SCHEMA_VERSION + 1
        );
        std::fs::write(manager.config_path(), content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("newer than supported")
        );
    }
}
