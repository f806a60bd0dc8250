//! Raw environment snapshot to Sync Model conversion
//!
//! A raw snapshot is what the management API returns: every entity carries
//! an internal `id`, and references between entities point at those ids.
//! Normalization indexes every id-bearing object by codename, rewrites
//! references to codenames, drops ids and volatile fields and finally
//! derives external ids wherever the environment has none, so that
//! normalizing an unchanged environment twice gives identical models.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::element::{Element, ElementData, ElementKind};
use crate::entity::{AssetFolder, TaxonomyTerm, WebSpotlight};
use crate::error::{Error, Result};
use crate::guidelines;
use crate::kind::{EntityKind, ReferenceKind};
use crate::model::SyncModel;
use crate::reference::{derive_external_id, placeholder_external_id};

/// Key fields of a content item or asset living in an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKey {
    pub id: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// Raw, id-bearing export of an environment's content model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSnapshot {
    pub content_types: Vec<Value>,
    pub content_type_snippets: Vec<Value>,
    pub taxonomies: Vec<Value>,
    pub collections: Vec<Value>,
    pub asset_folders: Vec<Value>,
    pub spaces: Vec<Value>,
    pub languages: Vec<Value>,
    pub web_spotlight: Option<Value>,
    /// Content items referenced from the model
    pub items: Vec<ContentKey>,
    /// Assets referenced from the model
    pub assets: Vec<ContentKey>,
}

/// Convert a raw snapshot into a Sync Model.
///
/// Structural references to ids missing from the snapshot are fatal. Item
/// and asset references to unknown ids degrade to placeholder external ids.
pub fn normalize(snapshot: &EnvironmentSnapshot) -> Result<SyncModel> {
    let index = IdIndex::build(snapshot);

    let mut model = SyncModel {
        content_types: index.normalize_all(EntityKind::ContentTypes, &snapshot.content_types)?,
        content_type_snippets: index
            .normalize_all(EntityKind::ContentTypeSnippets, &snapshot.content_type_snippets)?,
        taxonomies: index.normalize_all(EntityKind::Taxonomies, &snapshot.taxonomies)?,
        collections: index.normalize_all(EntityKind::Collections, &snapshot.collections)?,
        asset_folders: index.normalize_all(EntityKind::AssetFolders, &snapshot.asset_folders)?,
        spaces: index.normalize_all(EntityKind::Spaces, &snapshot.spaces)?,
        languages: index.normalize_all(EntityKind::Languages, &snapshot.languages)?,
        web_spotlight: match &snapshot.web_spotlight {
            Some(raw) => {
                let mut raw = raw.clone();
                index.rewrite(&mut raw, Scope::Structural, EntityKind::WebSpotlight.as_str())?;
                serde_json::from_value(raw)?
            }
            None => WebSpotlight::default(),
        },
    };

    assign_external_ids(&mut model);

    tracing::debug!(
        types = model.content_types.len(),
        snippets = model.content_type_snippets.len(),
        taxonomies = model.taxonomies.len(),
        indexed_ids = index.structural.len(),
        "Normalized environment snapshot"
    );

    Ok(model)
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    /// References between model entities; unknown ids are fatal
    Structural,
    /// References to independently migrated items or assets
    Content(ReferenceKind),
}

struct IdIndex {
    structural: HashMap<String, String>,
    items: HashMap<String, String>,
    assets: HashMap<String, String>,
}

impl IdIndex {
    fn build(snapshot: &EnvironmentSnapshot) -> Self {
        let mut structural = HashMap::new();
        let roots = snapshot
            .content_types
            .iter()
            .chain(&snapshot.content_type_snippets)
            .chain(&snapshot.taxonomies)
            .chain(&snapshot.collections)
            .chain(&snapshot.asset_folders)
            .chain(&snapshot.spaces)
            .chain(&snapshot.languages);
        for root in roots {
            index_ids(root, &mut structural);
        }

        let keys = |entries: &[ContentKey]| {
            entries
                .iter()
                .map(|k| (k.id.clone(), k.codename.clone()))
                .collect::<HashMap<_, _>>()
        };

        Self {
            structural,
            items: keys(&snapshot.items),
            assets: keys(&snapshot.assets),
        }
    }

    fn content_codename(&self, kind: ReferenceKind, id: &str) -> Option<String> {
        let map = match kind {
            ReferenceKind::Item => &self.items,
            ReferenceKind::Asset => &self.assets,
        };
        map.get(id).cloned()
    }

    fn normalize_all<T: DeserializeOwned>(&self, kind: EntityKind, raw: &[Value]) -> Result<Vec<T>> {
        raw.iter()
            .enumerate()
            .map(|(i, entity)| {
                let location = format!("{}/{}", kind, i);
                if entity.get("codename").and_then(Value::as_str).is_none() {
                    return Err(Error::MissingCodename { location });
                }
                let mut entity = entity.clone();
                self.rewrite(&mut entity, Scope::Structural, &location)?;
                Ok(serde_json::from_value(entity)?)
            })
            .collect()
    }

    fn rewrite(&self, value: &mut Value, scope: Scope, location: &str) -> Result<()> {
        if let Some(replacement) = self.replace_reference(value, scope, location)? {
            *value = replacement;
            return Ok(());
        }

        match value {
            Value::Array(items) => {
                for (i, item) in items.iter_mut().enumerate() {
                    self.rewrite(item, scope, &format!("{}/{}", location, i))?;
                }
            }
            Value::Object(map) => {
                map.remove("id");
                map.remove("last_modified");
                let element_kind = map
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(ElementKind::from_tag);

                for (key, child) in map.iter_mut() {
                    if key == "guidelines" {
                        if let Value::String(html) = child {
                            *html = guidelines::ids_to_codenames(html, |kind, id| {
                                self.content_codename(kind, id)
                            });
                            continue;
                        }
                    }
                    let child_scope = match key.as_str() {
                        "default" => element_kind
                            .and_then(|k| k.default_reference_kind())
                            .map_or(scope, Scope::Content),
                        "web_spotlight_root_item" => Scope::Content(ReferenceKind::Item),
                        _ => scope,
                    };
                    self.rewrite(child, child_scope, &format!("{}/{}", location, key))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Replacement for `value` when it is a reference object carrying an id
    fn replace_reference(&self, value: &Value, scope: Scope, location: &str) -> Result<Option<Value>> {
        let Value::Object(map) = value else {
            return Ok(None);
        };
        let is_reference = map.contains_key("id")
            && map
                .keys()
                .all(|k| matches!(k.as_str(), "id" | "codename" | "external_id"));
        if !is_reference {
            return Ok(None);
        }

        if let Some(codename) = map.get("codename").and_then(Value::as_str) {
            return Ok(Some(json!({ "codename": codename })));
        }
        let Some(id) = map.get("id").and_then(Value::as_str) else {
            return Ok(None);
        };

        match scope {
            Scope::Structural => match self.structural.get(id) {
                Some(codename) => Ok(Some(json!({ "codename": codename }))),
                None => Err(Error::DanglingReference {
                    id: id.to_string(),
                    location: location.to_string(),
                }),
            },
            Scope::Content(kind) => Ok(Some(match self.content_codename(kind, id) {
                Some(codename) => json!({ "codename": codename }),
                None => {
                    tracing::debug!(%kind, id, location, "Unknown reference, using placeholder");
                    json!({ "external_id": placeholder_external_id(kind, id) })
                }
            })),
        }
    }
}

/// Record every object carrying both an `id` and a `codename`
fn index_ids(value: &Value, index: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            if let (Some(id), Some(codename)) = (
                map.get("id").and_then(Value::as_str),
                map.get("codename").and_then(Value::as_str),
            ) {
                index.insert(id.to_string(), codename.to_string());
            }
            for child in map.values() {
                index_ids(child, index);
            }
        }
        Value::Array(items) => {
            for item in items {
                index_ids(item, index);
            }
        }
        _ => {}
    }
}

fn fill(slot: &mut Option<String>, parent: &str, codename: &str) {
    if slot.is_none() {
        *slot = Some(derive_external_id(parent, codename));
    }
}

fn assign_external_ids(model: &mut SyncModel) {
    for ty in &mut model.content_types {
        let path = derive_external_id(EntityKind::ContentTypes.as_str(), &ty.codename);
        fill(&mut ty.external_id, EntityKind::ContentTypes.as_str(), &ty.codename);
        let groups = derive_external_id(&path, "group");
        for group in &mut ty.content_groups {
            fill(&mut group.external_id, &groups, &group.codename);
        }
        assign_element_ids(&derive_external_id(&path, "element"), &mut ty.elements);
    }
    for snippet in &mut model.content_type_snippets {
        let path = derive_external_id(EntityKind::ContentTypeSnippets.as_str(), &snippet.codename);
        fill(
            &mut snippet.external_id,
            EntityKind::ContentTypeSnippets.as_str(),
            &snippet.codename,
        );
        assign_element_ids(&derive_external_id(&path, "element"), &mut snippet.elements);
    }
    for group in &mut model.taxonomies {
        fill(&mut group.external_id, EntityKind::Taxonomies.as_str(), &group.codename);
        assign_term_ids(&group.codename, &mut group.terms);
    }
    assign_folder_ids(EntityKind::AssetFolders.as_str(), &mut model.asset_folders);
    for collection in &mut model.collections {
        fill(
            &mut collection.external_id,
            EntityKind::Collections.as_str(),
            &collection.codename,
        );
    }
    for space in &mut model.spaces {
        fill(&mut space.external_id, EntityKind::Spaces.as_str(), &space.codename);
    }
    for language in &mut model.languages {
        fill(&mut language.external_id, EntityKind::Languages.as_str(), &language.codename);
    }
}

fn assign_element_ids(parent: &str, elements: &mut [Element]) {
    for element in elements {
        fill(&mut element.external_id, parent, &element.codename);
        if let ElementData::MultipleChoice(choice) = &mut element.data {
            let options_parent = derive_external_id(parent, &element.codename);
            for option in &mut choice.options {
                fill(&mut option.external_id, &options_parent, &option.codename);
            }
        }
    }
}

fn assign_term_ids(parent: &str, terms: &mut [TaxonomyTerm]) {
    for term in terms {
        fill(&mut term.external_id, parent, &term.codename);
        let path = derive_external_id(parent, &term.codename);
        assign_term_ids(&path, &mut term.terms);
    }
}

fn assign_folder_ids(parent: &str, folders: &mut [AssetFolder]) {
    for folder in folders {
        fill(&mut folder.external_id, parent, &folder.codename);
        let path = derive_external_id(parent, &folder.codename);
        assign_folder_ids(&path, &mut folder.folders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{CodenameRef, Reference};
    use pretty_assertions::assert_eq;

    fn snapshot() -> EnvironmentSnapshot {
        serde_json::from_value(json!({
            "content_types": [{
                "id": "t-1",
                "name": "Article",
                "codename": "article",
                "last_modified": "2024-01-01T00:00:00Z",
                "content_groups": [{"id": "g-1", "name": "Main", "codename": "main"}],
                "elements": [
                    {
                        "id": "e-1",
                        "codename": "related",
                        "type": "modular_content",
                        "name": "Related",
                        "content_group": {"id": "g-1"},
                        "allowed_content_types": [{"id": "t-1"}],
                        "default": {"global": {"value": [{"id": "i-1"}, {"id": "i-gone"}]}},
                        "guidelines": "<a data-asset-id=\"a-1\">x</a>"
                    },
                    {
                        "id": "e-2",
                        "codename": "tags",
                        "type": "taxonomy",
                        "name": "Tags",
                        "content_group": {"id": "g-1"},
                        "taxonomy_group": {"id": "tx-1"}
                    }
                ]
            }],
            "taxonomies": [{
                "id": "tx-1",
                "name": "Colors",
                "codename": "colors",
                "terms": [{"id": "tm-1", "name": "Red", "codename": "red", "terms": []}]
            }],
            "languages": [{
                "id": "l-1",
                "name": "English",
                "codename": "en",
                "is_default": true,
                "fallback_language": {"id": "l-1"}
            }],
            "web_spotlight": {"enabled": true, "root_type": {"id": "t-1"}},
            "items": [{"id": "i-1", "codename": "launch_post"}],
            "assets": [{"id": "a-1", "codename": "hero_image"}]
        }))
        .unwrap()
    }

    #[test]
    fn rewrites_structural_references_to_codenames() {
        let model = normalize(&snapshot()).unwrap();

        let article = model.content_type("article").unwrap();
        let tags = article.element("tags").unwrap();
        assert_eq!(tags.content_group, Some(CodenameRef::new("main")));
        match &tags.data {
            ElementData::Taxonomy(t) => assert_eq!(t.taxonomy_group, CodenameRef::new("colors")),
            other => panic!("unexpected element {:?}", other),
        }
        assert_eq!(
            model.languages[0].fallback_language,
            Some(CodenameRef::new("en"))
        );
        assert_eq!(model.web_spotlight.root_type, Some(CodenameRef::new("article")));
    }

    #[test]
    fn unknown_items_become_placeholders() {
        let model = normalize(&snapshot()).unwrap();

        let related = model.content_type("article").unwrap().element("related").unwrap();
        let refs: Vec<_> = related
            .data
            .default_references()
            .into_iter()
            .map(|(_, r)| r.clone())
            .collect();
        assert_eq!(
            refs,
            vec![
                Reference::codename("launch_post"),
                Reference::external_id("non-existent-item-i-gone"),
            ]
        );
        assert_eq!(
            related.data.guidelines(),
            Some(r#"<a data-asset-codename="hero_image">x</a>"#)
        );
    }

    #[test]
    fn derives_stable_external_ids() {
        let first = normalize(&snapshot()).unwrap();
        let second = normalize(&snapshot()).unwrap();

        assert_eq!(first, second);
        let article = first.content_type("article").unwrap();
        assert_eq!(article.external_id.as_deref(), Some("contentTypes.article"));
        assert_eq!(
            article.element("tags").unwrap().external_id.as_deref(),
            Some("contentTypes.article.element.tags")
        );
        assert_eq!(
            article.content_groups[0].external_id.as_deref(),
            Some("contentTypes.article.group.main")
        );
        assert_eq!(
            first.taxonomies[0].terms[0].external_id.as_deref(),
            Some("colors.red")
        );
    }

    #[test]
    fn group_and_element_sharing_a_codename_get_distinct_ids() {
        let mut raw = snapshot();
        raw.content_types[0]["elements"][1]["codename"] = json!("main");

        let model = normalize(&raw).unwrap();

        let article = model.content_type("article").unwrap();
        let group_id = article.content_groups[0].external_id.clone();
        let element_id = article.element("main").unwrap().external_id.clone();
        assert_eq!(element_id.as_deref(), Some("contentTypes.article.element.main"));
        assert_ne!(group_id, element_id);
    }

    #[test]
    fn keeps_existing_external_ids() {
        let mut raw = snapshot();
        raw.content_types[0]["external_id"] = json!("legacy-article");

        let model = normalize(&raw).unwrap();

        assert_eq!(
            model.content_types[0].external_id.as_deref(),
            Some("legacy-article")
        );
    }

    #[test]
    fn dangling_structural_reference_is_fatal() {
        let mut raw = snapshot();
        raw.content_types[0]["elements"][1]["taxonomy_group"] = json!({"id": "tx-missing"});

        let err = normalize(&raw).unwrap_err();

        match err {
            Error::DanglingReference { id, location } => {
                assert_eq!(id, "tx-missing");
                assert_eq!(location, "contentTypes/0/elements/1/taxonomy_group");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn entity_without_codename_is_rejected() {
        let raw: EnvironmentSnapshot =
            serde_json::from_value(json!({"collections": [{"id": "c-1", "name": "Default"}]}))
                .unwrap();

        assert!(matches!(normalize(&raw), Err(Error::MissingCodename { .. })));
    }
}
