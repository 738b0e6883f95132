//! Binary crate for the `codis` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive station browsing and date entry
//! - Human-friendly output formatting
//!
//! All retrieval, flattening, and CSV writing lives in `codis-core`; the
//! shell here only collects a station and a date range, invokes the pipeline,
//! and re-prompts on user-side errors.

use clap::Parser;

mod cli;
mod menu;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cmd = cli::Cli::parse();
    cmd.run().await
}
