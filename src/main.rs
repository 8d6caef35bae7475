//! Tagdex - a music library indexer.
//!
//! Decodes the ID3v2 tag at the front of each MP3 in a library tree,
//! aggregates the decoded metadata into an artist/album/track catalog, and
//! serves read queries over that catalog from the command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod id3;
pub mod library;
pub mod model;
pub mod scanner;
pub mod store;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("tagdex=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
