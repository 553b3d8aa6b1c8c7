//! delete command - Remove objects
//!
//! Deletes one object by name, or every object in a folder whose name
//! matches a pattern.

use clap::Args;
use gcsb_core::{Action, DestinationSpec, Request};

use super::Context;
use super::args::{CredentialArgs, SourceArgs};
use super::runner;
use crate::exit_code::ExitCode;

/// Delete files from a bucket
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Bucket to delete from
    #[arg(long)]
    pub bucket_name: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Only show what would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

impl DeleteArgs {
    fn request(&self) -> Request {
        Request {
            action: Action::Delete {
                bucket: self.bucket_name.clone(),
            },
            source: self.source.to_spec(),
            destination: DestinationSpec::default(),
            dry_run: self.dry_run,
        }
    }
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, ctx: &Context) -> ExitCode {
    runner::run(ctx, &args.credentials.service_account, Ok(args.request())).await
}
