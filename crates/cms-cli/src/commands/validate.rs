//! The validate and normalize commands

use std::fs;
use std::path::Path;

use colored::Colorize;
use cms_model::{EntityKind, EnvironmentSnapshot, SyncModel, load_folder, normalize, write_folder};

use crate::error::Result;

fn count(model: &SyncModel, kind: EntityKind) -> usize {
    match kind {
        EntityKind::ContentTypes => model.content_types.len(),
        EntityKind::ContentTypeSnippets => model.content_type_snippets.len(),
        EntityKind::Taxonomies => model.taxonomies.len(),
        EntityKind::Collections => model.collections.len(),
        EntityKind::AssetFolders => model.asset_folders.len(),
        EntityKind::Spaces => model.spaces.len(),
        EntityKind::Languages => model.languages.len(),
        EntityKind::WebSpotlight => usize::from(model.web_spotlight.enabled),
    }
}

fn print_counts(model: &SyncModel) {
    for kind in EntityKind::ALL {
        println!("   {:<22} {}", kind.as_str(), count(model, kind));
    }
}

/// Run the validate command
pub fn run_validate(dir: &Path) -> Result<()> {
    let model = load_folder(dir)?;

    println!("{} {} is a valid snapshot.", "OK".green().bold(), dir.display().to_string().cyan());
    print_counts(&model);
    Ok(())
}

/// Run the normalize command
///
/// Reads a raw export, replaces internal ids with codenames and writes the
/// snapshot folder.
pub fn run_normalize(snapshot: &Path, out: &Path) -> Result<()> {
    let text = fs::read_to_string(snapshot)?;
    let raw: EnvironmentSnapshot = serde_json::from_str(&text)?;

    let model = normalize(&raw)?;
    write_folder(out, &model)?;

    println!(
        "{} Normalized {} into {}",
        "OK".green().bold(),
        snapshot.display().to_string().cyan(),
        out.display().to_string().cyan()
    );
    print_counts(&model);
    Ok(())
}
