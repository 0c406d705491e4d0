//! mention-loader - resolve @mentions in prompt text into a context block
//!
//! mention-loader provides:
//! - Mention scanning and path resolution (cwd or repository root)
//! - Bounded, binary-safe content loading with per-mention skip reasons
//! - A tool-capability facade over a JSON `mentions` array
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    mention_loader::logging::init_logging(cli.verbose, cli.quiet, !cli.no_color);
    cli::run(cli).await
}
