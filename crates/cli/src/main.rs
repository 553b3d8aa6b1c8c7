//! gcsb - Google Cloud Storage batch file tool
//!
//! Downloads, uploads, moves and deletes files in Google Cloud Storage,
//! selected by exact name or by a regular expression over a folder.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gcsb_cli::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so stdout stays clean for --json output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
