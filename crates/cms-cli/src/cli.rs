//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cms_model::EntityKind;

/// Content-model sync - compare and synchronize content models between environments
#[derive(Parser, Debug)]
#[command(name = "cms-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Source and target snapshot folders
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Snapshots {
    /// Folder holding the source model
    #[arg(short, long)]
    pub source: PathBuf,

    /// Folder holding the target model
    #[arg(short, long)]
    pub target: PathBuf,

    /// Entity kinds to include, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub entities: Vec<EntityKind>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show what a sync would change in the target
    Diff {
        #[command(flatten)]
        snapshots: Snapshots,

        /// Output the Diff Model as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Synchronize the source model into the target folder
    ///
    /// Examples:
    ///   cms-sync sync -s dev -t prod              # Confirm, then apply
    ///   cms-sync sync -s dev -t prod --dry-run    # Only list the actions
    ///   cms-sync sync -s dev -t prod -e taxonomies --yes
    Sync {
        #[command(flatten)]
        snapshots: Snapshots,

        /// TOML file with sync settings; flags override it
        #[arg(short, long, env = "CMS_SYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Record failed steps and keep going
        #[arg(long)]
        continue_on_error: bool,

        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate a snapshot folder
    Validate {
        /// Folder to validate
        dir: PathBuf,
    },

    /// Convert a raw environment export into a snapshot folder
    Normalize {
        /// JSON export with internal ids
        #[arg(long)]
        snapshot: PathBuf,

        /// Folder to write the normalized model into
        #[arg(short, long)]
        out: PathBuf,
    },
}
