//! The Diff Model: per-kind additions, updates and deletions

use std::collections::{BTreeMap, BTreeSet, HashSet};

use cms_model::{
    Collection, ContentType, ContentTypeSnippet, EntityFilter, EntityKind, Keyed, Language, Space,
    SyncModel, TaxonomyGroup,
};
use serde::{Deserialize, Serialize};

use crate::adjust::adjust;
use crate::entities::{
    WebSpotlightChange, diff_asset_folders, diff_collection, diff_content_type, diff_language,
    diff_snippet, diff_space, diff_taxonomy_group, diff_web_spotlight,
};
use crate::handler::Handler;
use crate::handlers::reorder_moves;
use crate::operation::{OperationKind, PatchOperation};

/// Changes to one entity kind.
///
/// `updated` maps a codename to the adjusted operations that turn the
/// target entity into the source entity. `order` holds the moves that put
/// the kind's list into source order once additions have been appended; it
/// is only computed for kinds whose order the target exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDiff<T> {
    pub added: Vec<T>,
    pub updated: BTreeMap<String, Vec<PatchOperation>>,
    pub deleted: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<PatchOperation>,
}

impl<T> Default for EntityDiff<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: BTreeMap::new(),
            deleted: BTreeSet::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Keyed + Clone> EntityDiff<T> {
    pub fn compute<H: Handler<T>>(source: &[T], target: &[T], handler: H) -> Self {
        let source_keys: HashSet<&str> = source.iter().map(Keyed::codename).collect();
        let mut diff = Self::default();

        for s in source {
            match target.iter().find(|t| t.codename() == s.codename()) {
                None => diff.added.push(s.clone()),
                Some(t) => {
                    let ops = adjust(handler.diff(s, t));
                    if !ops.is_empty() {
                        diff.updated.insert(s.codename().to_string(), ops);
                    }
                }
            }
        }
        diff.deleted = target
            .iter()
            .map(Keyed::codename)
            .filter(|key| !source_keys.contains(key))
            .map(str::to_string)
            .collect();
        diff
    }

    /// Also reconcile the order of the kind's list
    pub fn with_order(mut self, source: &[T], target: &[T]) -> Self {
        self.order = reorder_moves(source, target);
        self
    }
}

impl<T> EntityDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty() && self.order.is_empty()
    }

    pub fn counts(&self) -> DiffCounts {
        DiffCounts {
            added: self.added.len(),
            updated: self.updated.len(),
            deleted: self.deleted.len(),
            moved: self.order.len(),
        }
    }
}

/// Number of changes of each kind, for summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffCounts {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub moved: usize,
}

impl DiffCounts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The complete set of changes that turn a target model into a source model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffModel {
    pub content_types: EntityDiff<ContentType>,
    pub content_type_snippets: EntityDiff<ContentTypeSnippet>,
    pub taxonomies: EntityDiff<TaxonomyGroup>,
    pub collections: EntityDiff<Collection>,
    pub spaces: EntityDiff<Space>,
    pub languages: EntityDiff<Language>,
    pub asset_folders: Vec<PatchOperation>,
    pub web_spotlight: WebSpotlightChange,
}

impl DiffModel {
    /// Compare two models, restricted to the kinds admitted by `filter`
    pub fn compute(source: &SyncModel, target: &SyncModel, filter: &EntityFilter) -> Self {
        let source = source.filtered(filter);
        let target = target.filtered(filter);

        let diff = Self {
            content_types: EntityDiff::compute(&source.content_types, &target.content_types, diff_content_type),
            content_type_snippets: EntityDiff::compute(
                &source.content_type_snippets,
                &target.content_type_snippets,
                diff_snippet,
            ),
            taxonomies: EntityDiff::compute(&source.taxonomies, &target.taxonomies, diff_taxonomy_group),
            collections: EntityDiff::compute(&source.collections, &target.collections, diff_collection)
                .with_order(&source.collections, &target.collections),
            spaces: EntityDiff::compute(&source.spaces, &target.spaces, diff_space),
            languages: EntityDiff::compute(&source.languages, &target.languages, diff_language)
                .with_order(&source.languages, &target.languages),
            asset_folders: diff_asset_folders(&source.asset_folders, &target.asset_folders),
            web_spotlight: diff_web_spotlight(&source.web_spotlight, &target.web_spotlight),
        };

        for (kind, counts) in diff.counts() {
            if !counts.is_empty() {
                tracing::debug!(
                    kind = %kind,
                    added = counts.added,
                    updated = counts.updated,
                    deleted = counts.deleted,
                    moved = counts.moved,
                    "Computed diff"
                );
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.content_types.is_empty()
            && self.content_type_snippets.is_empty()
            && self.taxonomies.is_empty()
            && self.collections.is_empty()
            && self.spaces.is_empty()
            && self.languages.is_empty()
            && self.asset_folders.is_empty()
            && self.web_spotlight.is_none()
    }

    /// Change counts per kind, in the order kinds are listed on the CLI.
    ///
    /// Asset folder operations are counted by kind; the Web Spotlight
    /// marker counts as one update.
    pub fn counts(&self) -> Vec<(EntityKind, DiffCounts)> {
        let count = |kind: OperationKind| self.asset_folders.iter().filter(|op| op.kind() == kind).count();
        let asset_folders = DiffCounts {
            added: count(OperationKind::AddInto),
            updated: count(OperationKind::Replace),
            deleted: count(OperationKind::Remove),
            moved: count(OperationKind::Move),
        };
        let web_spotlight = DiffCounts {
            updated: usize::from(!self.web_spotlight.is_none()),
            ..DiffCounts::default()
        };

        vec![
            (EntityKind::ContentTypes, self.content_types.counts()),
            (EntityKind::ContentTypeSnippets, self.content_type_snippets.counts()),
            (EntityKind::Taxonomies, self.taxonomies.counts()),
            (EntityKind::Collections, self.collections.counts()),
            (EntityKind::AssetFolders, asset_folders),
            (EntityKind::Spaces, self.spaces.counts()),
            (EntityKind::Languages, self.languages.counts()),
            (EntityKind::WebSpotlight, web_spotlight),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_model::CodenameRef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn collection(codename: &str) -> Collection {
        Collection {
            name: codename.to_uppercase(),
            codename: codename.into(),
            external_id: None,
        }
    }

    #[test]
    fn entity_diff_partitions_by_codename() {
        let source = vec![collection("a"), collection("b")];
        let mut changed = collection("b");
        changed.name = "Bee".into();
        let target = vec![changed, collection("c")];

        let diff = EntityDiff::compute(&source, &target, diff_collection);

        assert_eq!(diff.added, vec![collection("a")]);
        assert_eq!(
            diff.updated.get("b"),
            Some(&vec![PatchOperation::replace("/name", "B", "Bee")])
        );
        assert_eq!(diff.deleted, BTreeSet::from(["c".to_string()]));
        assert!(diff.order.is_empty());
    }

    #[test]
    fn filter_excludes_kinds() {
        let source = SyncModel {
            collections: vec![collection("a")],
            languages: vec![Language {
                name: "English".into(),
                codename: "en".into(),
                external_id: None,
                is_active: true,
                is_default: true,
                fallback_language: Some(CodenameRef::new("en")),
            }],
            ..SyncModel::default()
        };

        let diff = DiffModel::compute(&source, &SyncModel::default(), &EntityFilter::only([EntityKind::Languages]));

        assert!(diff.collections.is_empty());
        assert_eq!(diff.languages.added.len(), 1);
    }

    #[test]
    fn serializes_with_camel_case_kinds() {
        let source = SyncModel {
            collections: vec![collection("b"), collection("a")],
            ..SyncModel::default()
        };
        let target = SyncModel {
            collections: vec![collection("a"), collection("b")],
            ..SyncModel::default()
        };

        let value = serde_json::to_value(DiffModel::compute(&source, &target, &EntityFilter::all())).unwrap();

        assert_eq!(value["collections"]["order"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["webSpotlight"], json!({"change": "none"}));
        assert!(value["contentTypeSnippets"]["updated"].as_object().unwrap().is_empty());
        assert!(value["spaces"].get("order").is_none());
    }
}
