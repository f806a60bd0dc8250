//! In-memory application of patch operations
//!
//! Used for snapshot targets: a Diff Model computed against a folder can be
//! applied to it without a live environment.

use cms_model::{CodenameRef, EntityKind, Keyed, SyncModel, WebSpotlight};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::entities::WebSpotlightChange;
use crate::error::{Error, Result};
use crate::model::{DiffModel, EntityDiff};
use crate::operation::{Anchor, PatchOperation};
use crate::path::{PathSegment, format_path, get_at_path_mut, parse_path, position_of};

/// Apply operations to a JSON document in order
pub fn apply_operations(document: &mut Value, ops: &[PatchOperation]) -> Result<()> {
    for op in ops {
        tracing::trace!(operation = %op, "Applying operation");
        apply_operation(document, op)?;
    }
    Ok(())
}

fn apply_operation(document: &mut Value, op: &PatchOperation) -> Result<()> {
    let path = op.path();
    let segments = parse_path(path);

    match op {
        PatchOperation::AddInto { value, .. } => {
            let array = array_at(document, &segments, path)?;
            insert_anchored(array, value.clone(), op.anchor(), path)
        }
        PatchOperation::Remove { .. } => {
            let Some((last, parent)) = segments.split_last() else {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: "the document itself cannot be removed".into(),
                });
            };
            let container = get_at_path_mut(document, parent).ok_or_else(|| Error::path_not_found(path))?;
            match last {
                PathSegment::Codename(codename) => {
                    let array = container.as_array_mut().ok_or_else(|| Error::NotAnArray {
                        path: format_path(parent),
                    })?;
                    let index = position_of(array, codename).ok_or_else(|| Error::path_not_found(path))?;
                    array.remove(index);
                }
                PathSegment::Key(key) => {
                    container
                        .as_object_mut()
                        .and_then(|object| object.remove(key))
                        .ok_or_else(|| Error::path_not_found(path))?;
                }
            }
            Ok(())
        }
        PatchOperation::Replace { value, .. } => {
            match segments.split_last() {
                None => *document = value.clone(),
                // Absent optional fields are omitted rather than stored as null
                Some((PathSegment::Key(key), parent)) => {
                    let object = get_at_path_mut(document, parent)
                        .and_then(Value::as_object_mut)
                        .ok_or_else(|| Error::path_not_found(path))?;
                    if value.is_null() {
                        object.remove(key);
                    } else {
                        object.insert(key.clone(), value.clone());
                    }
                }
                Some((PathSegment::Codename(_), _)) => {
                    let member = get_at_path_mut(document, &segments).ok_or_else(|| Error::path_not_found(path))?;
                    *member = value.clone();
                }
            }
            Ok(())
        }
        PatchOperation::Move { .. } => {
            let Some((PathSegment::Codename(codename), parent)) = segments.split_last() else {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: "a move must address an array member".into(),
                });
            };
            let array = array_at(document, parent, path)?;
            let index = position_of(array, codename).ok_or_else(|| Error::path_not_found(path))?;
            let member = array.remove(index);
            insert_anchored(array, member, op.anchor(), path)
        }
    }
}

fn array_at<'v>(document: &'v mut Value, segments: &[PathSegment], path: &str) -> Result<&'v mut Vec<Value>> {
    get_at_path_mut(document, segments)
        .ok_or_else(|| Error::path_not_found(path))?
        .as_array_mut()
        .ok_or_else(|| Error::NotAnArray {
            path: format_path(segments),
        })
}

fn insert_anchored(array: &mut Vec<Value>, value: Value, anchor: Option<Anchor>, path: &str) -> Result<()> {
    let index = match &anchor {
        None => array.len(),
        Some(anchor) => {
            let position = position_of(array, anchor.codename()).ok_or_else(|| Error::AnchorNotFound {
                path: path.to_string(),
                codename: anchor.codename().to_string(),
            })?;
            match anchor {
                Anchor::Before(_) => position,
                Anchor::After(_) => position + 1,
            }
        }
    };
    array.insert(index, value);
    Ok(())
}

/// Apply a whole Diff Model to a model, returning the patched copy
pub fn apply_diff(model: &SyncModel, diff: &DiffModel) -> Result<SyncModel> {
    let mut model = model.clone();

    apply_entity_diff(&mut model.collections, &diff.collections, EntityKind::Collections)?;
    apply_entity_diff(&mut model.languages, &diff.languages, EntityKind::Languages)?;
    apply_entity_diff(&mut model.spaces, &diff.spaces, EntityKind::Spaces)?;
    apply_entity_diff(&mut model.taxonomies, &diff.taxonomies, EntityKind::Taxonomies)?;
    apply_entity_diff(
        &mut model.content_type_snippets,
        &diff.content_type_snippets,
        EntityKind::ContentTypeSnippets,
    )?;
    apply_entity_diff(&mut model.content_types, &diff.content_types, EntityKind::ContentTypes)?;
    for content_type in &mut model.content_types {
        content_type.prune_dangling_group_refs();
    }

    if !diff.asset_folders.is_empty() {
        model.asset_folders = patch_value(&model.asset_folders, &diff.asset_folders)?;
    }

    model.web_spotlight = match &diff.web_spotlight {
        WebSpotlightChange::None => model.web_spotlight,
        WebSpotlightChange::Activate { root_type_codename }
        | WebSpotlightChange::ChangeRootType { root_type_codename } => WebSpotlight {
            enabled: true,
            root_type: Some(CodenameRef::new(root_type_codename.as_str())),
        },
        // The root type is kept so a later activation can reuse it
        WebSpotlightChange::Deactivate => WebSpotlight {
            enabled: false,
            ..model.web_spotlight
        },
    };

    Ok(model)
}

fn apply_entity_diff<T>(items: &mut Vec<T>, diff: &EntityDiff<T>, kind: EntityKind) -> Result<()>
where
    T: Keyed + Clone + Serialize + DeserializeOwned,
{
    items.retain(|item| !diff.deleted.contains(item.codename()));

    for (codename, ops) in &diff.updated {
        let item = items
            .iter_mut()
            .find(|item| item.codename() == codename)
            .ok_or_else(|| Error::EntityNotFound {
                kind,
                codename: codename.clone(),
            })?;
        *item = patch_value(item, ops)?;
    }

    items.extend(diff.added.iter().cloned());

    if !diff.order.is_empty() {
        *items = patch_value(items, &diff.order)?;
    }
    Ok(())
}

fn patch_value<T: Serialize + DeserializeOwned>(value: &T, ops: &[PatchOperation]) -> Result<T> {
    let mut document = serde_json::to_value(value)?;
    apply_operations(&mut document, ops)?;
    Ok(serde_json::from_value(document)?)
}
