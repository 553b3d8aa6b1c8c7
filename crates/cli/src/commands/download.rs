//! download command - Fetch objects into local files
//!
//! Downloads one object by name, or every object in a folder whose name
//! matches a pattern, into a folder under the working directory.

use clap::Args;
use gcsb_core::{Action, Request, Result};

use super::Context;
use super::args::{CredentialArgs, DestinationArgs, SourceArgs};
use super::runner;
use crate::exit_code::ExitCode;

/// Download files from a bucket
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Bucket to download from
    #[arg(long)]
    pub bucket_name: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub destination: DestinationArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Only show what would be downloaded
    #[arg(long)]
    pub dry_run: bool,
}

impl DownloadArgs {
    fn request(&self) -> Result<Request> {
        Ok(Request {
            action: Action::Download {
                bucket: self.bucket_name.clone(),
                local_root: runner::working_dir()?,
            },
            source: self.source.to_spec(),
            destination: self.destination.to_spec(),
            dry_run: self.dry_run,
        })
    }
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, ctx: &Context) -> ExitCode {
    runner::run(ctx, &args.credentials.service_account, args.request()).await
}
