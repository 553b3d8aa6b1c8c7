//! move command - Move objects (copy + delete source)
//!
//! Moves objects within a bucket or across buckets. Each object is copied
//! first; the source is deleted only once the copy has succeeded.

use clap::Args;
use gcsb_core::{Action, Request};

use super::Context;
use super::args::{CredentialArgs, DestinationArgs, SourceArgs};
use super::runner;
use crate::exit_code::ExitCode;

/// Move files between folders or buckets
#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Bucket to move from
    #[arg(long)]
    pub source_bucket_name: String,

    /// Bucket to move to
    #[arg(long)]
    pub destination_bucket_name: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub destination: DestinationArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Only show what would be moved
    #[arg(long)]
    pub dry_run: bool,
}

impl MoveArgs {
    fn request(&self) -> Request {
        Request {
            action: Action::Move {
                source_bucket: self.source_bucket_name.clone(),
                destination_bucket: self.destination_bucket_name.clone(),
            },
            source: self.source.to_spec(),
            destination: self.destination.to_spec(),
            dry_run: self.dry_run,
        }
    }
}

/// Execute the move command
pub async fn execute(args: MoveArgs, ctx: &Context) -> ExitCode {
    runner::run(ctx, &args.credentials.service_account, Ok(args.request())).await
}
