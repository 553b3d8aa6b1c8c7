//! upload command - Push local files into a bucket
//!
//! Source paths are relative to the working directory. In regex mode every
//! file under the source folder, recursively, is a candidate.

use clap::Args;
use gcsb_core::{Action, Request, Result};

use super::Context;
use super::args::{CredentialArgs, DestinationArgs, SourceArgs};
use super::runner;
use crate::exit_code::ExitCode;

/// Upload files to a bucket
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Bucket to upload to
    #[arg(long)]
    pub bucket_name: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub destination: DestinationArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Only show what would be uploaded
    #[arg(long)]
    pub dry_run: bool,
}

impl UploadArgs {
    fn request(&self) -> Result<Request> {
        Ok(Request {
            action: Action::Upload {
                bucket: self.bucket_name.clone(),
                local_root: runner::working_dir()?,
            },
            source: self.source.to_spec(),
            destination: self.destination.to_spec(),
            dry_run: self.dry_run,
        })
    }
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, ctx: &Context) -> ExitCode {
    runner::run(ctx, &args.credentials.service_account, args.request()).await
}
