//! Progress spinner for per-object transfers
//!
//! GCS transfers report no byte-level progress through the storage client,
//! so each step shows an indeterminate spinner with the current object.

use std::time::Duration;

use super::OutputConfig;

/// Progress spinner wrapper
///
/// Handles progress display based on output configuration.
/// In quiet or JSON mode, or when stderr is not a terminal, nothing is drawn.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a spinner for indeterminate progress
    pub fn spinner(config: &OutputConfig, message: &str) -> Self {
        Self::build(config, message, console::Term::stderr().is_term())
    }

    fn build(config: &OutputConfig, message: &str, is_term: bool) -> Self {
        let bar = if config.quiet || config.json || config.no_progress || !is_term {
            None
        } else {
            let bar = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            Some(bar)
        };

        Self { bar }
    }

    /// Set message
    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Hide the spinner while `f` writes to the terminal
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    /// Finish and clear the spinner
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if the spinner is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_quiet_mode() {
        let config = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        assert!(!ProgressBar::build(&config, "working", true).is_visible());
    }

    #[test]
    fn test_spinner_json_mode() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        };
        assert!(!ProgressBar::build(&config, "working", true).is_visible());
    }

    #[test]
    fn test_spinner_no_progress() {
        let config = OutputConfig {
            no_progress: true,
            ..Default::default()
        };
        assert!(!ProgressBar::build(&config, "working", true).is_visible());
    }

    #[test]
    fn test_spinner_not_a_terminal() {
        let config = OutputConfig::default();
        assert!(!ProgressBar::build(&config, "working", false).is_visible());
    }

    #[test]
    fn test_spinner_normal() {
        let config = OutputConfig::default();
        let bar = ProgressBar::build(&config, "working", true);
        assert!(bar.is_visible());

        let mut ran = false;
        bar.suspend(|| ran = true);
        assert!(ran);
        bar.finish_and_clear();
    }
}
