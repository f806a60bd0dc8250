//! The sync command

use std::path::{Path, PathBuf};

use colored::Colorize;
use dialoguer::Confirm;

use cms_core::{MemoryEnvironment, SyncConfig, SyncEngine, SyncPlan, SyncReport};
use cms_model::{load_folder, write_folder};

use crate::cli::Snapshots;
use crate::commands::diff::print_diff;
use crate::commands::entity_filter;
use crate::error::{CliError, Result};

/// Flags of the sync command that override the configuration file
#[derive(Debug, Clone, Default)]
pub struct SyncFlags {
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub continue_on_error: bool,
    pub yes: bool,
}

/// Run the sync command
///
/// Applies the source model to the target snapshot folder and writes the
/// result back, unless this is a dry run. A run aborted by a failed unit
/// still writes back what was applied before the failure; there is no
/// rollback.
pub async fn run_sync(snapshots: &Snapshots, flags: &SyncFlags) -> Result<()> {
    let config = match &flags.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };
    let mut options = config.into_options();
    options.dry_run |= flags.dry_run;
    options.continue_on_error |= flags.continue_on_error;
    if let Some(filter) = entity_filter(&snapshots.entities) {
        options.entities = filter;
    }
    let dry_run = options.dry_run;

    let source = load_folder(&snapshots.source)?;
    let target = load_folder(&snapshots.target)?;

    let engine = SyncEngine::new(MemoryEnvironment::new(target.clone()), SyncPlan::standard(), options);
    let diff = engine.diff(&source, &target);
    if diff.is_empty() {
        println!("{} Target already matches the source.", "OK".green().bold());
        return Ok(());
    }

    println!(
        "{} Syncing {} into {}{}",
        "=>".blue().bold(),
        snapshots.source.display().to_string().cyan(),
        snapshots.target.display().to_string().cyan(),
        if dry_run { " (dry run)".yellow().to_string() } else { String::new() }
    );
    print_diff(&diff);
    println!();

    if !dry_run && !flags.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Apply these changes to {}?", snapshots.target.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted; nothing was changed.");
            return Ok(());
        }
    }

    let outcome = engine.execute(&source, &target, &diff).await;
    if !dry_run {
        write_back(&snapshots.target, &engine, &outcome)?;
    }
    let report = outcome?;

    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }

    if !report.success {
        println!();
        for error in &report.errors {
            println!("   {} {}", "!".red(), error);
        }
        return Err(CliError::user(format!(
            "{} step(s) failed; the target was only partially synced",
            report.errors.len()
        )));
    }

    if dry_run {
        println!("{} Dry run complete. No changes were made.", "OK".green().bold());
    } else {
        println!("{} Sync complete.", "OK".green().bold());
    }
    Ok(())
}

/// Persist the in-memory target once anything may have been applied.
///
/// Errors raised before the first mutation leave the folder untouched.
fn write_back(
    dir: &Path,
    engine: &SyncEngine<MemoryEnvironment>,
    outcome: &cms_core::Result<SyncReport>,
) -> Result<()> {
    match outcome {
        Ok(_) | Err(cms_core::Error::Apply { .. }) => {
            write_folder(dir, &engine.client().model())?;
        }
        Err(_) => {}
    }
    Ok(())
}
