//! CLI command definitions and execution
//!
//! Each transfer command turns its arguments into a `Request` and hands it
//! to the shared runner; they differ only in which action they build.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod args;
mod completions;
mod download;
mod mv;
mod rm;
mod runner;
mod upload;

pub use args::MatchType;

/// gcsb - Google Cloud Storage batch file tool
///
/// Download, upload, move and delete files in Google Cloud Storage,
/// addressed by exact name or by a regular expression over a folder.
#[derive(Parser, Debug)]
#[command(name = "gcsb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Directory holding config.toml
    #[arg(long, global = true, env = "GCSB_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download files from a bucket
    Download(download::DownloadArgs),

    /// Upload files to a bucket
    Upload(upload::UploadArgs),

    /// Move files (copy + delete source)
    #[command(visible_alias = "mv")]
    Move(mv::MoveArgs),

    /// Delete files from a bucket
    #[command(visible_alias = "rm")]
    Delete(rm::DeleteArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Settings every command receives from the global flags
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub output: OutputConfig,
    pub config_dir: Option<PathBuf>,
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let ctx = Context {
        output: OutputConfig {
            json: cli.json,
            no_color: cli.no_color,
            no_progress: cli.no_progress,
            quiet: cli.quiet,
        },
        config_dir: cli.config_dir,
    };

    match cli.command {
        Commands::Download(args) => download::execute(args, &ctx).await,
        Commands::Upload(args) => upload::execute(args, &ctx).await,
        Commands::Move(args) => mv::execute(args, &ctx).await,
        Commands::Delete(args) => rm::execute(args, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_download_regex() {
        let cli = Cli::try_parse_from([
            "gcsb",
            "download",
            "--bucket-name",
            "reports",
            "--source-file-name",
            r"\.csv$",
            "--source-file-name-match-type",
            "regex_match",
            "--source-folder-name",
            "in/daily",
            "--destination-file-name",
            "daily.csv",
            "--destination-folder-name",
            "out",
            "--service-account",
            "/etc/gcp/key.json",
        ])
        .unwrap();

        let Commands::Download(args) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(args.bucket_name, "reports");
        assert_eq!(args.source.source_file_name_match_type, MatchType::RegexMatch);
        assert_eq!(args.source.source_folder_name, "in/daily");
        assert_eq!(args.destination.destination_file_name.as_deref(), Some("daily.csv"));
        assert_eq!(args.credentials.service_account, "/etc/gcp/key.json");
        assert!(!args.dry_run);
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from([
            "gcsb",
            "upload",
            "--bucket-name",
            "b",
            "--source-file-name",
            "a.csv",
            "--service-account",
            "key.json",
        ])
        .unwrap();

        let Commands::Upload(args) = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(args.source.source_file_name_match_type, MatchType::ExactMatch);
        assert_eq!(args.source.source_folder_name, "");
        assert!(args.destination.destination_file_name.is_none());
        assert_eq!(args.destination.destination_folder_name, "");
    }

    #[test]
    fn test_parse_move_requires_both_buckets() {
        let err = Cli::try_parse_from([
            "gcsb",
            "move",
            "--source-bucket-name",
            "a",
            "--source-file-name",
            "x.csv",
            "--service-account",
            "key.json",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_move_and_alias() {
        let cli = Cli::try_parse_from([
            "gcsb",
            "mv",
            "--source-bucket-name",
            "a",
            "--destination-bucket-name",
            "b",
            "--source-file-name",
            "x.csv",
            "--service-account",
            "key.json",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert_eq!(args.source_bucket_name, "a");
        assert_eq!(args.destination_bucket_name, "b");
        assert!(args.dry_run);
    }

    #[test]
    fn test_parse_delete_has_no_destination_flags() {
        let err = Cli::try_parse_from([
            "gcsb",
            "delete",
            "--bucket-name",
            "b",
            "--source-file-name",
            "x.csv",
            "--destination-folder-name",
            "out",
            "--service-account",
            "key.json",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_parse_rejects_unknown_match_type() {
        let err = Cli::try_parse_from([
            "gcsb",
            "delete",
            "--bucket-name",
            "b",
            "--source-file-name",
            "x",
            "--source-file-name-match-type",
            "glob_match",
            "--service-account",
            "key.json",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gcsb",
            "delete",
            "--bucket-name",
            "b",
            "--source-file-name",
            "x",
            "--service-account",
            "key.json",
            "--json",
            "--quiet",
            "--config-dir",
            "/tmp/gcsb",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/gcsb")));
    }
}
