//! Arguments shared by the transfer commands

use clap::{Args, ValueEnum};
use gcsb_core::{DestinationSpec, MatchMode, SourceSpec};

/// How `--source-file-name` is interpreted
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// The name of a single file
    #[value(name = "exact_match")]
    ExactMatch,
    /// A regular expression searched anywhere in each path under the source folder
    #[value(name = "regex_match")]
    RegexMatch,
}

impl From<MatchType> for MatchMode {
    fn from(value: MatchType) -> Self {
        match value {
            MatchType::ExactMatch => MatchMode::Exact,
            MatchType::RegexMatch => MatchMode::Regex,
        }
    }
}

/// Which file(s) to operate on
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Name of the source file, or a pattern with --source-file-name-match-type regex_match
    #[arg(long)]
    pub source_file_name: String,

    /// Match the source file name exactly or as a regular expression
    #[arg(long, value_enum, default_value = "exact_match")]
    pub source_file_name_match_type: MatchType,

    /// Folder the source file(s) live in
    #[arg(long, default_value = "")]
    pub source_folder_name: String,
}

impl SourceArgs {
    pub fn to_spec(&self) -> SourceSpec {
        SourceSpec::new(
            &self.source_folder_name,
            self.source_file_name.as_str(),
            self.source_file_name_match_type.into(),
        )
    }
}

/// Where the file(s) end up
#[derive(Args, Debug, Clone)]
pub struct DestinationArgs {
    /// New file name; numbered _1, _2, ... when a pattern matches several files
    #[arg(long)]
    pub destination_file_name: Option<String>,

    /// Folder to place the file(s) in
    #[arg(long, default_value = "")]
    pub destination_folder_name: String,
}

impl DestinationArgs {
    pub fn to_spec(&self) -> DestinationSpec {
        DestinationSpec::new(
            &self.destination_folder_name,
            self.destination_file_name.as_deref(),
        )
    }
}

/// Service account used to reach GCS
#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    /// Path to a service account key file, or the key JSON itself
    #[arg(long, env = "GCSB_SERVICE_ACCOUNT", hide_env_values = true)]
    pub service_account: String,
}
