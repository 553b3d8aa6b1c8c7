//! Shared execution path for the transfer commands
//!
//! Every command builds a [`Request`] and hands it here: load configuration,
//! materialize credentials, connect, run the driver, then map the result to an
//! exit code. Temporary credentials are removed before this returns.

use std::path::PathBuf;

use gcsb_core::{
    ActionKind, ConfigManager, CredentialSource, Driver, Error, Outcome, Reporter, Request,
    Result, Step, Summary,
};
use gcsb_gcs::{GcsClient, GcsConfig};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Final line emitted in JSON mode
#[derive(Debug, Serialize)]
struct RunOutput {
    status: &'static str,
    operation: ActionKind,
    matched: usize,
    completed: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    dry_run: bool,
}

/// Directory local files are read from and written to
pub(crate) fn working_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// Run a request built by one of the commands
pub(crate) async fn run(ctx: &Context, service_account: &str, request: Result<Request>) -> ExitCode {
    let flags_formatter = Formatter::new(ctx.output.clone());

    let request = match request {
        Ok(r) => r,
        Err(e) => {
            flags_formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let config = match config_manager(ctx).and_then(|m| m.load()) {
        Ok(c) => c,
        Err(e) => {
            flags_formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let formatter = Formatter::new(ctx.output.clone().with_defaults(&config.defaults));
    let kind = request.action.kind();

    let result = {
        let credentials = match CredentialSource::from_arg(service_account).materialize() {
            Ok(c) => c,
            Err(e) => {
                formatter.error(&e.to_string());
                return ExitCode::from_error(&e);
            }
        };

        let gcs_config = GcsConfig {
            credential_path: credentials.path().to_path_buf(),
            endpoint: config.storage.endpoint.clone(),
            upload_chunk_size: config.storage.effective_chunk_size(),
        };

        match GcsClient::new(gcs_config) {
            Ok(client) => {
                let mut reporter = CliReporter::new(&formatter);
                let result = Driver::new(&client).run(&request, &mut reporter).await;
                reporter.finish();
                result
            }
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(summary) => {
            report_summary(&formatter, kind, &summary, request.dry_run);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn config_manager(ctx: &Context) -> Result<ConfigManager> {
    let manager = match &ctx.config_dir {
        Some(dir) => ConfigManager::in_dir(dir),
        None => ConfigManager::new()?,
    };
    tracing::debug!(path = %manager.config_path().display(), "Loading configuration");
    Ok(manager)
}

fn report_summary(formatter: &Formatter, kind: ActionKind, summary: &Summary, dry_run: bool) {
    if formatter.is_json() {
        formatter.json_line(&RunOutput {
            status: "success",
            operation: kind,
            matched: summary.matched,
            completed: summary.completed.len(),
            dry_run,
        });
        return;
    }

    if !dry_run && summary.completed.len() > 1 {
        formatter.success(&format!(
            "{} files {}",
            summary.completed.len(),
            past_tense(kind)
        ));
    }
}

const fn past_tense(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Download => "downloaded",
        ActionKind::Upload => "uploaded",
        ActionKind::Move => "moved",
        ActionKind::Delete => "deleted",
    }
}

/// Prints driver progress through the formatter and a spinner
struct CliReporter<'a> {
    formatter: &'a Formatter,
    spinner: Option<ProgressBar>,
}

impl<'a> CliReporter<'a> {
    fn new(formatter: &'a Formatter) -> Self {
        Self {
            formatter,
            spinner: None,
        }
    }

    fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print(&self, f: impl FnOnce()) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

impl Reporter for CliReporter<'_> {
    fn matched(&mut self, kind: ActionKind, count: usize) {
        self.formatter.println(&format!(
            "{count} files found. Preparing to {}...",
            kind.verb()
        ));
    }

    fn step_started(&mut self, kind: ActionKind, step: &Step) {
        let message = format!(
            "{} file {} of {}: {}",
            kind.progressive(),
            step.index,
            step.total,
            step.source
        );

        if let Some(spinner) = &self.spinner {
            spinner.set_message(&message);
        } else {
            self.spinner = Some(ProgressBar::spinner(self.formatter.config(), &message));
        }

        let visible = self.spinner.as_ref().is_some_and(ProgressBar::is_visible);
        if !visible && step.total > 1 {
            self.formatter.println(&format!(
                "{} file {} of {}",
                kind.progressive(),
                step.index,
                step.total
            ));
        }
    }

    fn step_completed(&mut self, outcome: &Outcome) {
        let formatter = self.formatter;
        self.print(|| print_outcome(formatter, outcome));
    }

    fn step_failed(&mut self, _step: &Step, error: &Error) {
        self.finish();
        if let Error::IncompleteMove { source_object, .. } = error {
            self.formatter.warning(&format!(
                "{source_object} was copied but not deleted; remove it manually to finish the move"
            ));
        }
    }
}

fn print_outcome(formatter: &Formatter, outcome: &Outcome) {
    if formatter.is_json() {
        formatter.json_line(outcome);
    } else if outcome.dry_run {
        formatter.println(&outcome.message());
    } else {
        match &outcome.size_human {
            Some(size) => formatter.success(&format!(
                "{} {}",
                outcome.message(),
                formatter.dim(&format!("({size})"))
            )),
            None => formatter.success(&outcome.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;

    fn outcome() -> Outcome {
        Outcome {
            operation: ActionKind::Download,
            index: 1,
            total: 2,
            source: "reports/in/a.csv".into(),
            destination: Some("/work/out/a_1.csv".into()),
            size_bytes: Some(2048),
            size_human: Some("2 KiB".into()),
            dry_run: false,
        }
    }

    #[test]
    fn test_outcome_json_shape() {
        insta::assert_json_snapshot!(outcome(), @r#"
        {
          "operation": "download",
          "index": 1,
          "total": 2,
          "source": "reports/in/a.csv",
          "destination": "/work/out/a_1.csv",
          "size_bytes": 2048,
          "size_human": "2 KiB"
        }
        "#);
    }

    #[test]
    fn test_run_output_json_shape() {
        let output = RunOutput {
            status: "success",
            operation: ActionKind::Delete,
            matched: 0,
            completed: 0,
            dry_run: false,
        };
        insta::assert_json_snapshot!(output, @r#"
        {
          "status": "success",
          "operation": "delete",
          "matched": 0,
          "completed": 0
        }
        "#);
    }

    #[test]
    fn test_past_tense() {
        assert_eq!(past_tense(ActionKind::Move), "moved");
        assert_eq!(past_tense(ActionKind::Upload), "uploaded");
    }

    #[test]
    fn test_reporter_quiet_creates_hidden_spinner() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let mut reporter = CliReporter::new(&formatter);
        let step = Step {
            index: 1,
            total: 1,
            source: "a.csv".into(),
            destination: None,
        };

        reporter.step_started(ActionKind::Delete, &step);
        assert!(reporter.spinner.as_ref().is_some_and(|s| !s.is_visible()));

        reporter.step_failed(&step, &Error::ObjectNotFound("b/a.csv".into()));
        assert!(reporter.spinner.is_none());
    }
}
