//! The diff command

use colored::Colorize;
use cms_diff::{DiffModel, EntityDiff, PatchOperation, WebSpotlightChange};
use cms_model::{EntityFilter, EntityKind, Keyed, load_folder};

use crate::cli::Snapshots;
use crate::commands::entity_filter;
use crate::error::Result;

/// Run the diff command
///
/// Loads both snapshots and prints the changes that would turn the target
/// into the source.
pub fn run_diff(snapshots: &Snapshots, json: bool) -> Result<()> {
    let source = load_folder(&snapshots.source)?;
    let target = load_folder(&snapshots.target)?;
    let filter = entity_filter(&snapshots.entities).unwrap_or_else(EntityFilter::all);

    let diff = DiffModel::compute(&source, &target, &filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    println!(
        "{} Comparing {} with {}",
        "=>".blue().bold(),
        snapshots.source.display().to_string().cyan(),
        snapshots.target.display().to_string().cyan()
    );
    if diff.is_empty() {
        println!("{} No differences.", "OK".green().bold());
    } else {
        print_diff(&diff);
    }
    Ok(())
}

/// Print a Diff Model grouped by entity kind
pub fn print_diff(diff: &DiffModel) {
    print_entity_diff(EntityKind::Collections, &diff.collections);
    print_entity_diff(EntityKind::Languages, &diff.languages);
    print_entity_diff(EntityKind::Spaces, &diff.spaces);
    print_entity_diff(EntityKind::Taxonomies, &diff.taxonomies);
    print_entity_diff(EntityKind::ContentTypeSnippets, &diff.content_type_snippets);
    print_entity_diff(EntityKind::ContentTypes, &diff.content_types);

    if !diff.asset_folders.is_empty() {
        println!();
        println!("{}", EntityKind::AssetFolders.as_str().bold());
        print_operations(&diff.asset_folders);
    }

    let spotlight = match &diff.web_spotlight {
        WebSpotlightChange::None => None,
        WebSpotlightChange::Activate { root_type_codename } => {
            Some(format!("activate with root type {}", root_type_codename.cyan()))
        }
        WebSpotlightChange::ChangeRootType { root_type_codename } => {
            Some(format!("change root type to {}", root_type_codename.cyan()))
        }
        WebSpotlightChange::Deactivate => Some("deactivate".to_string()),
    };
    if let Some(change) = spotlight {
        println!();
        println!("{}", EntityKind::WebSpotlight.as_str().bold());
        println!("   {} {}", "~".yellow(), change);
    }
}

fn print_entity_diff<T: Keyed>(kind: EntityKind, diff: &EntityDiff<T>) {
    if diff.is_empty() {
        return;
    }
    let counts = diff.counts();
    println!();
    println!(
        "{} ({} added, {} updated, {} deleted)",
        kind.as_str().bold(),
        counts.added,
        counts.updated,
        counts.deleted
    );

    for added in &diff.added {
        println!("   {} {}", "+".green(), added.codename());
    }
    for (codename, ops) in &diff.updated {
        println!("   {} {}", "~".yellow(), codename);
        print_operations(ops);
    }
    for codename in &diff.deleted {
        println!("   {} {}", "-".red(), codename);
    }
    if !diff.order.is_empty() {
        println!("   {} reorder ({} moves)", "~".yellow(), diff.order.len());
    }
}

fn print_operations(ops: &[PatchOperation]) {
    for op in ops {
        println!("       {}", op.to_string().dimmed());
    }
}
