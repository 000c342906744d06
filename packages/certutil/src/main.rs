//! Main entry point for the certutil CLI

use certutil::cli::{Cli, process_command};
use certutil_common::LoggingTransformer;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingTransformer::init();

    let cli = Cli::parse();
    process_command(cli.command, cli.json).await
}
