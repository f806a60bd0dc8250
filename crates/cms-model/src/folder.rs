//! Snapshot folders: one JSON document per entity kind

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result, ValidationIssue};
use crate::kind::EntityKind;
use crate::model::SyncModel;
use crate::validation::{validate_document, validate_model};

/// Load and validate a snapshot folder.
///
/// A missing per-kind file means the kind is empty. Issues from every file
/// are collected and returned together as [`Error::Validation`].
pub fn load_folder(dir: &Path) -> Result<SyncModel> {
    if !dir.is_dir() {
        return Err(Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "snapshot folder not found"),
        ));
    }

    let mut issues = Vec::new();
    let mut model = SyncModel::default();

    for kind in EntityKind::ALL {
        let path = dir.join(kind.file_name());
        if !path.exists() {
            tracing::debug!(?path, "No snapshot file, treating {} as empty", kind);
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let document: Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(e) => {
                issues.push(ValidationIssue::new(kind.file_name(), "", format!("invalid JSON: {}", e)));
                continue;
            }
        };

        let found = validate_document(kind, &document);
        if !found.is_empty() {
            issues.extend(found);
            continue;
        }

        match kind {
            EntityKind::ContentTypes => parse_into(kind, document, &mut model.content_types, &mut issues),
            EntityKind::ContentTypeSnippets => {
                parse_into(kind, document, &mut model.content_type_snippets, &mut issues)
            }
            EntityKind::Taxonomies => parse_into(kind, document, &mut model.taxonomies, &mut issues),
            EntityKind::Collections => parse_into(kind, document, &mut model.collections, &mut issues),
            EntityKind::AssetFolders => parse_into(kind, document, &mut model.asset_folders, &mut issues),
            EntityKind::Spaces => parse_into(kind, document, &mut model.spaces, &mut issues),
            EntityKind::Languages => parse_into(kind, document, &mut model.languages, &mut issues),
            EntityKind::WebSpotlight => parse_into(kind, document, &mut model.web_spotlight, &mut issues),
        }
    }

    if issues.is_empty() {
        issues = validate_model(&model);
    }
    if !issues.is_empty() {
        return Err(Error::Validation { issues });
    }

    tracing::debug!(?dir, "Loaded snapshot folder");
    Ok(model)
}

fn parse_into<T: DeserializeOwned>(
    kind: EntityKind,
    document: Value,
    slot: &mut T,
    issues: &mut Vec<ValidationIssue>,
) {
    match serde_json::from_value(document) {
        Ok(value) => *slot = value,
        Err(e) => issues.push(ValidationIssue::new(kind.file_name(), "", e.to_string())),
    }
}

/// Write every kind of `model` into `dir`, creating it when needed
pub fn write_folder(dir: &Path, model: &SyncModel) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    for kind in EntityKind::ALL {
        let text = match kind {
            EntityKind::ContentTypes => to_pretty(&model.content_types)?,
            EntityKind::ContentTypeSnippets => to_pretty(&model.content_type_snippets)?,
            EntityKind::Taxonomies => to_pretty(&model.taxonomies)?,
            EntityKind::Collections => to_pretty(&model.collections)?,
            EntityKind::AssetFolders => to_pretty(&model.asset_folders)?,
            EntityKind::Spaces => to_pretty(&model.spaces)?,
            EntityKind::Languages => to_pretty(&model.languages)?,
            EntityKind::WebSpotlight => to_pretty(&model.web_spotlight)?,
        };
        let path = dir.join(kind.file_name());
        fs::write(&path, text).map_err(|e| Error::io(&path, e))?;
    }

    Ok(())
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
