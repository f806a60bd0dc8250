//! An in-process target environment
//!
//! [`MemoryEnvironment`] implements [`ManagementClient`] over a
//! [`SyncModel`]. It backs syncs into on-disk snapshots and the tests.
//! Incoming payloads are turned back into the codename form of the model:
//! resolved `{id, codename}` references lose their id and guidelines links
//! go back to codename attributes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use cms_diff::{PatchOperation, apply_operations};
use cms_model::guidelines::ids_to_codenames;
use cms_model::{CodenameRef, EntityKind, Keyed, ReferenceKind, SyncModel};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::client::{ClientError, ClientResult, ManagementClient, RemoteEntity};

#[derive(Debug, Default)]
struct State {
    model: SyncModel,
    ids: HashMap<(EntityKind, String), String>,
    calls: Vec<String>,
    failing: Vec<String>,
}

impl State {
    fn id_of(&mut self, kind: EntityKind, codename: &str) -> String {
        self.ids
            .entry((kind, codename.to_string()))
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    /// Log a call; fail it if it was marked as failing
    fn record(&mut self, call: String) -> ClientResult<()> {
        let fails = self.failing.contains(&call);
        tracing::debug!(call = %call, "Memory environment call");
        self.calls.push(call.clone());
        if fails {
            Err(ClientError::request(format!("{} rejected", call)))
        } else {
            Ok(())
        }
    }
}

/// A target environment held in memory
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    state: Mutex<State>,
    items: Vec<RemoteEntity>,
    assets: Vec<RemoteEntity>,
}

impl MemoryEnvironment {
    pub fn new(model: SyncModel) -> Self {
        Self {
            state: Mutex::new(State {
                model,
                ..State::default()
            }),
            ..Self::default()
        }
    }

    /// Content items that exist in the environment
    pub fn with_items<'s>(mut self, codenames: impl IntoIterator<Item = &'s str>) -> Self {
        self.items.extend(codenames.into_iter().map(remote));
        self
    }

    /// Assets that exist in the environment
    pub fn with_assets<'s>(mut self, codenames: impl IntoIterator<Item = &'s str>) -> Self {
        self.assets.extend(codenames.into_iter().map(remote));
        self
    }

    /// Make a call fail; `call` uses the form recorded in [`calls`](Self::calls)
    pub fn fail_on(self, call: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failing.push(call.into());
        }
        self
    }

    /// Current model of the environment
    pub fn model(&self) -> SyncModel {
        self.state.lock().map(|s| s.model.clone()).unwrap_or_default()
    }

    /// Calls received so far, e.g. `add contentTypes article`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    fn state(&self) -> ClientResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ClientError::request("memory environment state is poisoned"))
    }

    /// Rewrite a payload from target form back to codename form
    fn denormalize(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                let is_resolved_reference =
                    map.len() == 2 && map.contains_key("id") && map.get("codename").is_some_and(Value::is_string);
                if is_resolved_reference {
                    map.remove("id");
                    return;
                }
                for (key, child) in map.iter_mut() {
                    match child {
                        Value::String(html) if key == "guidelines" => {
                            *html = ids_to_codenames(html, |kind, id| self.codename_of(kind, id));
                        }
                        _ => self.denormalize(child),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.denormalize(item)),
            _ => {}
        }
    }

    fn codename_of(&self, kind: ReferenceKind, id: &str) -> Option<String> {
        let entities = match kind {
            ReferenceKind::Item => &self.items,
            ReferenceKind::Asset => &self.assets,
        };
        entities.iter().find(|e| e.id == id).map(|e| e.codename.clone())
    }

    fn denormalized_ops(&self, ops: &[PatchOperation]) -> Vec<PatchOperation> {
        let mut ops = ops.to_vec();
        for op in &mut ops {
            if let Some(value) = op.value_mut() {
                self.denormalize(value);
            }
        }
        ops
    }
}

fn remote(codename: &str) -> RemoteEntity {
    RemoteEntity {
        id: Uuid::new_v4().to_string(),
        codename: codename.to_string(),
        external_id: None,
    }
}

fn add_to<T: Keyed + DeserializeOwned>(items: &mut Vec<T>, payload: Value) -> ClientResult<String> {
    let item: T = serde_json::from_value(payload).map_err(ClientError::request)?;
    let codename = item.codename().to_string();
    if items.iter().any(|i| i.codename() == codename) {
        return Err(ClientError::request(format!("codename `{}` is already in use", codename)));
    }
    items.push(item);
    Ok(codename)
}

fn patch_in<T>(items: &mut [T], kind: EntityKind, codename: &str, ops: &[PatchOperation]) -> ClientResult<()>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    let item = items
        .iter_mut()
        .find(|i| i.codename() == codename)
        .ok_or_else(|| ClientError::not_found(kind, codename))?;
    *item = patched(item, ops)?;
    Ok(())
}

fn patched<T: Serialize + DeserializeOwned>(value: &T, ops: &[PatchOperation]) -> ClientResult<T> {
    let mut document = serde_json::to_value(value).map_err(ClientError::request)?;
    apply_operations(&mut document, ops).map_err(ClientError::request)?;
    serde_json::from_value(document).map_err(ClientError::request)
}

fn delete_from<T: Keyed>(items: &mut Vec<T>, kind: EntityKind, codename: &str) -> ClientResult<()> {
    let before = items.len();
    items.retain(|i| i.codename() != codename);
    if items.len() == before {
        return Err(ClientError::not_found(kind, codename));
    }
    Ok(())
}

fn unsupported(kind: EntityKind, call: &str) -> ClientError {
    ClientError::request(format!("{} does not support {}", kind, call))
}

#[async_trait]
impl ManagementClient for MemoryEnvironment {
    async fn add_entity(&self, kind: EntityKind, mut payload: Value) -> ClientResult<RemoteEntity> {
        self.denormalize(&mut payload);
        let mut state = self.state()?;
        let codename = payload.get("codename").and_then(Value::as_str).unwrap_or_default();
        state.record(format!("add {} {}", kind, codename))?;

        let model = &mut state.model;
        let codename = match kind {
            EntityKind::ContentTypes => add_to(&mut model.content_types, payload)?,
            EntityKind::ContentTypeSnippets => add_to(&mut model.content_type_snippets, payload)?,
            EntityKind::Taxonomies => add_to(&mut model.taxonomies, payload)?,
            EntityKind::Collections => add_to(&mut model.collections, payload)?,
            EntityKind::Spaces => add_to(&mut model.spaces, payload)?,
            EntityKind::Languages => add_to(&mut model.languages, payload)?,
            EntityKind::AssetFolders | EntityKind::WebSpotlight => return Err(unsupported(kind, "add")),
        };

        let id = state.id_of(kind, &codename);
        Ok(RemoteEntity {
            id,
            codename,
            external_id: None,
        })
    }

    async fn patch_entity(&self, kind: EntityKind, codename: &str, ops: &[PatchOperation]) -> ClientResult<()> {
        let ops = self.denormalized_ops(ops);
        let mut state = self.state()?;
        state.record(format!("patch {} {}", kind, codename))?;

        let model = &mut state.model;
        match kind {
            EntityKind::ContentTypes => {
                patch_in(&mut model.content_types, kind, codename, &ops)?;
                for content_type in &mut model.content_types {
                    content_type.prune_dangling_group_refs();
                }
                Ok(())
            }
            EntityKind::ContentTypeSnippets => patch_in(&mut model.content_type_snippets, kind, codename, &ops),
            EntityKind::Taxonomies => patch_in(&mut model.taxonomies, kind, codename, &ops),
            EntityKind::Collections => patch_in(&mut model.collections, kind, codename, &ops),
            EntityKind::Spaces => patch_in(&mut model.spaces, kind, codename, &ops),
            EntityKind::Languages => patch_in(&mut model.languages, kind, codename, &ops),
            EntityKind::AssetFolders | EntityKind::WebSpotlight => Err(unsupported(kind, "entity patches")),
        }
    }

    async fn patch_list(&self, kind: EntityKind, ops: &[PatchOperation]) -> ClientResult<()> {
        let ops = self.denormalized_ops(ops);
        let mut state = self.state()?;
        state.record(format!("patchList {}", kind))?;

        let model = &mut state.model;
        match kind {
            EntityKind::AssetFolders => model.asset_folders = patched(&model.asset_folders, &ops)?,
            EntityKind::Collections => model.collections = patched(&model.collections, &ops)?,
            EntityKind::Languages => model.languages = patched(&model.languages, &ops)?,
            _ => return Err(unsupported(kind, "list patches")),
        }
        Ok(())
    }

    async fn delete_entity(&self, kind: EntityKind, codename: &str) -> ClientResult<()> {
        let mut state = self.state()?;
        state.record(format!("delete {} {}", kind, codename))?;

        let model = &mut state.model;
        match kind {
            EntityKind::ContentTypes => delete_from(&mut model.content_types, kind, codename)?,
            EntityKind::ContentTypeSnippets => delete_from(&mut model.content_type_snippets, kind, codename)?,
            EntityKind::Taxonomies => delete_from(&mut model.taxonomies, kind, codename)?,
            EntityKind::Collections => delete_from(&mut model.collections, kind, codename)?,
            EntityKind::Spaces => delete_from(&mut model.spaces, kind, codename)?,
            EntityKind::Languages => delete_from(&mut model.languages, kind, codename)?,
            EntityKind::AssetFolders | EntityKind::WebSpotlight => return Err(unsupported(kind, "delete")),
        }
        state.ids.remove(&(kind, codename.to_string()));
        Ok(())
    }

    async fn entity_id(&self, kind: EntityKind, codename: &str) -> ClientResult<String> {
        let mut state = self.state()?;
        let model = &state.model;
        let exists = match kind {
            EntityKind::ContentTypes => model.content_type(codename).is_some(),
            EntityKind::ContentTypeSnippets => model.snippet(codename).is_some(),
            EntityKind::Taxonomies => model.taxonomy(codename).is_some(),
            EntityKind::Collections => model.collection(codename).is_some(),
            EntityKind::Spaces => model.space(codename).is_some(),
            EntityKind::Languages => model.language(codename).is_some(),
            EntityKind::AssetFolders | EntityKind::WebSpotlight => false,
        };
        if !exists {
            return Err(ClientError::not_found(kind, codename));
        }
        Ok(state.id_of(kind, codename))
    }

    async fn find_content_item(&self, codename: &str) -> ClientResult<RemoteEntity> {
        self.state()?.record(format!("findItem {}", codename))?;
        self.items
            .iter()
            .find(|i| i.codename == codename)
            .cloned()
            .ok_or_else(|| ClientError::not_found(ReferenceKind::Item, codename))
    }

    async fn find_asset(&self, codename: &str) -> ClientResult<RemoteEntity> {
        self.state()?.record(format!("findAsset {}", codename))?;
        self.assets
            .iter()
            .find(|a| a.codename == codename)
            .cloned()
            .ok_or_else(|| ClientError::not_found(ReferenceKind::Asset, codename))
    }

    async fn activate_web_spotlight(&self, root_type_id: &str) -> ClientResult<()> {
        let mut state = self.state()?;
        let root = state
            .ids
            .iter()
            .find(|((kind, _), id)| *kind == EntityKind::ContentTypes && id.as_str() == root_type_id)
            .map(|((_, codename), _)| codename.clone())
            .ok_or_else(|| ClientError::not_found("content type id", root_type_id))?;
        state.record(format!("activateWebSpotlight {}", root))?;

        state.model.web_spotlight.enabled = true;
        state.model.web_spotlight.root_type = Some(CodenameRef::new(root));
        Ok(())
    }

    async fn deactivate_web_spotlight(&self) -> ClientResult<()> {
        let mut state = self.state()?;
        state.record("deactivateWebSpotlight".to_string())?;
        state.model.web_spotlight.enabled = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_model::Collection;
    use cms_test_utils::fixtures::{collection, sample_model};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_strips_resolved_ids() {
        let env = MemoryEnvironment::new(SyncModel::default()).with_items(["home"]);
        let home = env.find_content_item("home").await.unwrap();

        let payload = json!({
            "name": "Website",
            "codename": "website",
            "web_spotlight_root_item": {"id": home.id, "codename": "home"},
        });
        let created = env.add_entity(EntityKind::Spaces, payload).await.unwrap();

        assert_eq!(created.codename, "website");
        let model = env.model();
        assert_eq!(
            serde_json::to_value(&model.spaces[0].web_spotlight_root_item).unwrap(),
            json!({"codename": "home"})
        );
        assert_eq!(env.calls(), vec!["findItem home", "add spaces website"]);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_rejected() {
        let env = MemoryEnvironment::new(sample_model());
        let payload = serde_json::to_value(collection("default")).unwrap();

        let err = env.add_entity(EntityKind::Collections, payload).await.unwrap_err();

        assert!(matches!(err, ClientError::Request { .. }));
    }

    #[tokio::test]
    async fn test_patch_and_delete_missing_entity() {
        let env = MemoryEnvironment::new(sample_model());
        let ops = vec![PatchOperation::replace("/name", "Promo", "Marketing")];

        env.patch_entity(EntityKind::Collections, "marketing", &ops).await.unwrap();
        let renamed: Vec<Collection> = env.model().collections;
        assert_eq!(renamed[1].name, "Promo");

        let err = env.delete_entity(EntityKind::Taxonomies, "missing").await.unwrap_err();
        assert_eq!(err, ClientError::not_found(EntityKind::Taxonomies, "missing"));
    }

    #[tokio::test]
    async fn test_failing_call_is_still_logged() {
        let env = MemoryEnvironment::new(sample_model()).fail_on("delete languages de");

        assert!(env.delete_entity(EntityKind::Languages, "de").await.is_err());
        assert_eq!(env.calls(), vec!["delete languages de"]);
        assert_eq!(env.model().languages.len(), 2);
    }

    #[tokio::test]
    async fn test_web_spotlight_activation_by_id() {
        let mut model = sample_model();
        model.web_spotlight.enabled = false;
        let env = MemoryEnvironment::new(model);

        let id = env.entity_id(EntityKind::ContentTypes, "article").await.unwrap();
        env.activate_web_spotlight(&id).await.unwrap();

        let spotlight = env.model().web_spotlight;
        assert!(spotlight.enabled);
        assert_eq!(spotlight.root_type, Some(CodenameRef::new("article")));
    }
}
