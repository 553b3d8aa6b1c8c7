//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles progress spinners and colored output.

mod formatter;
mod progress;

use gcsb_core::config::Defaults;

pub use formatter::Formatter;
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Fold in config file defaults; a flag given on the command line always wins
    pub fn with_defaults(mut self, defaults: &Defaults) -> Self {
        self.json |= defaults.output == "json";
        self.no_color |= defaults.color == "never";
        self.no_progress |= !defaults.progress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_applies_config() {
        let defaults = Defaults {
            output: "json".into(),
            color: "never".into(),
            progress: false,
        };
        let config = OutputConfig::default().with_defaults(&defaults);
        assert!(config.json);
        assert!(config.no_color);
        assert!(config.no_progress);
        assert!(!config.quiet);
    }

    #[test]
    fn test_with_defaults_keeps_flags() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        }
        .with_defaults(&Defaults::default());
        assert!(config.json);
        assert!(!config.no_color);
        assert!(!config.no_progress);
    }
}
