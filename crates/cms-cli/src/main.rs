//! Content-model sync CLI
//!
//! Compares content-model snapshots and synchronizes one into another.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to set up logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Commands::Diff { snapshots, json } => commands::run_diff(&snapshots, json),
        Commands::Sync {
            snapshots,
            config,
            dry_run,
            continue_on_error,
            yes,
        } => {
            let flags = commands::SyncFlags {
                config,
                dry_run,
                continue_on_error,
                yes,
            };
            commands::run_sync(&snapshots, &flags).await
        }
        Commands::Validate { dir } => commands::run_validate(&dir),
        Commands::Normalize { snapshot, out } => commands::run_normalize(&snapshot, &out),
    }
}
