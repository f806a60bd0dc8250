//! Reference resolution against the target environment
//!
//! Content items and assets are migrated independently of the content
//! model, so the references to them in element defaults, guidelines and
//! space root items are looked up on the target by codename. A missing
//! item or asset is tolerated: the reference becomes a placeholder
//! external id and creation still succeeds.
//!
//! Structural references (languages, collections, taxonomies, types and
//! snippets) are not optional; [`verify_required`] checks them before any
//! mutation.

use std::collections::{BTreeSet, HashMap};

use cms_diff::PatchOperation;
use cms_diff::path::{PathSegment, parse_path};
use cms_model::guidelines::{codenames_to_ids, referenced_codenames};
use cms_model::{
    Element, ElementData, ElementKind, EntityFilter, EntityKind, Reference, ReferenceKind, SyncModel,
    placeholder_external_id,
};
use serde_json::{Value, json};

use crate::client::{ClientError, ManagementClient, RemoteEntity};
use crate::error::{Error, MissingReference, Result};

/// An item or asset referenced by codename
pub type ContentReference = (ReferenceKind, String);

/// Every item and asset codename the model references
pub fn collect_references(model: &SyncModel) -> BTreeSet<ContentReference> {
    let mut references = BTreeSet::new();

    let elements = model
        .content_types
        .iter()
        .flat_map(|t| &t.elements)
        .chain(model.content_type_snippets.iter().flat_map(|s| &s.elements));
    for element in elements {
        for (kind, reference) in element.data.default_references() {
            if let Some(codename) = reference.as_codename() {
                references.insert((kind, codename.to_string()));
            }
        }
        if let Some(html) = element.data.guidelines() {
            references.extend(referenced_codenames(html));
        }
    }

    for space in &model.spaces {
        if let Some(codename) = space.web_spotlight_root_item.as_ref().and_then(Reference::as_codename) {
            references.insert((ReferenceKind::Item, codename.to_string()));
        }
    }

    references
}

/// Codename lookup of the items and assets that exist on the target
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    resolved: HashMap<ContentReference, RemoteEntity>,
}

impl ReferenceResolver {
    /// Look up every reference on the target, one call at a time.
    ///
    /// `NotFound` answers are recorded as unresolved; any other client
    /// error aborts.
    pub async fn build<C>(client: &C, references: &BTreeSet<ContentReference>) -> Result<Self>
    where
        C: ManagementClient + ?Sized,
    {
        let mut resolved = HashMap::new();

        for (kind, codename) in references {
            let found = match kind {
                ReferenceKind::Item => client.find_content_item(codename).await,
                ReferenceKind::Asset => client.find_asset(codename).await,
            };
            match found {
                Ok(entity) => {
                    tracing::debug!(kind = %kind, codename = %codename, id = %entity.id, "Resolved reference");
                    resolved.insert((*kind, codename.clone()), entity);
                }
                Err(ClientError::NotFound { .. }) => {
                    tracing::warn!(
                        kind = %kind,
                        codename = %codename,
                        "Referenced {} not found on target; using a placeholder",
                        kind
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self { resolved })
    }

    pub fn from_entities(entities: impl IntoIterator<Item = (ReferenceKind, RemoteEntity)>) -> Self {
        Self {
            resolved: entities
                .into_iter()
                .map(|(kind, entity)| ((kind, entity.codename.clone()), entity))
                .collect(),
        }
    }

    pub fn lookup(&self, kind: ReferenceKind, codename: &str) -> Option<&RemoteEntity> {
        self.resolved.get(&(kind, codename.to_string()))
    }

    /// Target form of a reference.
    ///
    /// A resolved codename becomes `{id, codename}`, an unresolved one a
    /// placeholder `{external_id}`. External-id references pass through.
    ///
    /// The placeholder is `non-existent-<item|asset>-<codename>`: a Sync
    /// Model no longer carries source ids, so the codename stands in for
    /// the old id. References that were already dangling at normalization
    /// keep their `non-existent-<kind>-<old id>` form.
    pub fn resolve(&self, kind: ReferenceKind, reference: &Reference) -> Value {
        match reference {
            Reference::Codename { codename } => match self.lookup(kind, codename) {
                Some(entity) => json!({"id": entity.id, "codename": codename}),
                None => json!({"external_id": placeholder_external_id(kind, codename)}),
            },
            Reference::ExternalId { external_id } => json!({"external_id": external_id}),
        }
    }

    pub fn rewrite_guidelines(&self, html: &str) -> String {
        codenames_to_ids(html, |kind, codename| self.lookup(kind, codename).map(|e| e.id.clone()))
    }

    /// Rewrite the item and asset references inside an add payload
    pub fn rewrite_value(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                let default_kind = map
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(ElementKind::from_tag)
                    .and_then(|kind| kind.default_reference_kind());
                for (key, child) in map.iter_mut() {
                    match (key.as_str(), default_kind) {
                        ("guidelines", _) => self.rewrite_guidelines_value(child),
                        ("default", Some(kind)) => self.rewrite_default(child, kind),
                        ("web_spotlight_root_item", _) => self.rewrite_reference(child, ReferenceKind::Item),
                        _ => self.rewrite_value(child),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.rewrite_value(item)),
            _ => {}
        }
    }

    /// Rewrite the values of patch operations on one entity.
    ///
    /// `elements` are the source elements of the patched entity; they tell
    /// which kind of reference a replaced `default` holds.
    pub fn rewrite_operations(&self, ops: &mut [PatchOperation], elements: &[Element]) {
        for op in ops {
            let segments = parse_path(op.path());
            let default_kind = match segments.as_slice() {
                [.., PathSegment::Key(list), PathSegment::Codename(codename), PathSegment::Key(field)]
                    if list == "elements" && field == "default" =>
                {
                    elements
                        .iter()
                        .find(|e| e.codename == *codename)
                        .and_then(|e| e.kind().default_reference_kind())
                }
                _ => None,
            };
            let last = match segments.last() {
                Some(PathSegment::Key(key)) => key.as_str(),
                _ => "",
            };
            let Some(value) = op.value_mut() else {
                continue;
            };
            match (last, default_kind) {
                ("guidelines", _) => self.rewrite_guidelines_value(value),
                ("default", Some(kind)) => self.rewrite_default(value, kind),
                ("web_spotlight_root_item", _) => self.rewrite_reference(value, ReferenceKind::Item),
                _ => self.rewrite_value(value),
            }
        }
    }

    fn rewrite_guidelines_value(&self, value: &mut Value) {
        if let Value::String(html) = value {
            *html = self.rewrite_guidelines(html);
        }
    }

    /// `{"global": {"value": [references]}}`
    fn rewrite_default(&self, value: &mut Value, kind: ReferenceKind) {
        let references = value
            .get_mut("global")
            .and_then(|global| global.get_mut("value"))
            .and_then(Value::as_array_mut);
        for reference in references.into_iter().flatten() {
            self.rewrite_reference(reference, kind);
        }
    }

    fn rewrite_reference(&self, value: &mut Value, kind: ReferenceKind) {
        if value.is_null() {
            return;
        }
        if let Ok(reference) = serde_json::from_value::<Reference>(value.clone()) {
            *value = self.resolve(kind, &reference);
        }
    }
}

/// Check that every required reference of the synced source entities
/// will have something to point at.
///
/// For a kind being synced the target will mirror the source, so the
/// source is consulted; for any other kind the target is.
pub fn verify_required(source: &SyncModel, target: &SyncModel, filter: &EntityFilter) -> Result<()> {
    let synced = source.filtered(filter);
    let exists = |kind: EntityKind, codename: &str| {
        let model = if filter.includes(kind) { &synced } else { target };
        match kind {
            EntityKind::ContentTypes => model.content_type(codename).is_some(),
            EntityKind::ContentTypeSnippets => model.snippet(codename).is_some(),
            EntityKind::Taxonomies => model.taxonomy(codename).is_some(),
            EntityKind::Collections => model.collection(codename).is_some(),
            EntityKind::Languages => model.language(codename).is_some(),
            EntityKind::Spaces => model.space(codename).is_some(),
            EntityKind::AssetFolders | EntityKind::WebSpotlight => true,
        }
    };

    let mut required: Vec<MissingReference> = Vec::new();
    let mut require = |kind: EntityKind, codename: &str, location: String| {
        required.push(MissingReference {
            kind,
            codename: codename.to_string(),
            location,
        });
    };

    for language in &synced.languages {
        if let Some(fallback) = &language.fallback_language {
            require(
                EntityKind::Languages,
                &fallback.codename,
                format!("languages/{}/fallback_language", language.codename),
            );
        }
    }
    for space in &synced.spaces {
        for collection in &space.collections {
            require(
                EntityKind::Collections,
                &collection.codename,
                format!("spaces/{}/collections", space.codename),
            );
        }
    }
    let owners = synced
        .content_types
        .iter()
        .map(|t| (EntityKind::ContentTypes, &t.codename, &t.elements))
        .chain(
            synced
                .content_type_snippets
                .iter()
                .map(|s| (EntityKind::ContentTypeSnippets, &s.codename, &s.elements)),
        );
    for (owner_kind, owner, elements) in owners {
        for element in elements {
            let location = format!("{}/{}/elements/{}", owner_kind, owner, element.codename);
            match &element.data {
                ElementData::Taxonomy(e) => require(EntityKind::Taxonomies, &e.taxonomy_group.codename, location),
                ElementData::Snippet(e) => require(EntityKind::ContentTypeSnippets, &e.snippet.codename, location),
                ElementData::UrlSlug(e) => {
                    if let Some(snippet) = &e.depends_on.snippet {
                        require(EntityKind::ContentTypeSnippets, &snippet.codename, location);
                    }
                }
                ElementData::RichText(_) | ElementData::LinkedItems(_) | ElementData::Subpages(_) => {
                    for codename in element.data.type_references() {
                        require(EntityKind::ContentTypes, codename, location.clone());
                    }
                }
                _ => {}
            }
        }
    }
    if synced.web_spotlight.enabled
        && let Some(root) = &synced.web_spotlight.root_type
    {
        require(EntityKind::ContentTypes, &root.codename, "webSpotlight/root_type".to_string());
    }

    let missing: Vec<MissingReference> = required
        .into_iter()
        .filter(|r| !exists(r.kind, &r.codename))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        for reference in &missing {
            tracing::error!(reference = %reference, "Unresolvable required reference");
        }
        Err(Error::UnresolvedReference { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_model::element::{AssetElement, DefaultValue};
    use cms_model::{CodenameRef, EntityKind};
    use cms_test_utils::fixtures::{
        content_type, language, rich_text_element, sample_model, space, taxonomy_element, text_element,
    };
    use pretty_assertions::assert_eq;

    fn asset_element(codename: &str, defaults: Vec<Reference>) -> Element {
        Element::new(
            codename,
            ElementData::Asset(AssetElement {
                name: "Hero".into(),
                guidelines: Some(r#"<p>See <a data-item-codename="style_guide">this</a></p>"#.into()),
                is_required: false,
                is_non_localizable: false,
                asset_count_limit: None,
                maximum_file_size: None,
                allowed_file_types: None,
                default: Some(DefaultValue::new(defaults)),
            }),
        )
    }

    fn resolver() -> ReferenceResolver {
        ReferenceResolver::from_entities([(
            ReferenceKind::Asset,
            RemoteEntity {
                id: "a-1".into(),
                codename: "banner".into(),
                external_id: None,
            },
        )])
    }

    #[test]
    fn collects_defaults_guidelines_and_root_items() {
        let model = SyncModel {
            content_types: vec![content_type(
                "article",
                vec![asset_element(
                    "hero",
                    vec![Reference::codename("banner"), Reference::external_id("legacy")],
                )],
            )],
            spaces: vec![space("site", Some("home"), &[])],
            ..SyncModel::default()
        };

        let references: Vec<_> = collect_references(&model).into_iter().collect();

        assert_eq!(
            references,
            vec![
                (ReferenceKind::Item, "home".to_string()),
                (ReferenceKind::Item, "style_guide".to_string()),
                (ReferenceKind::Asset, "banner".to_string()),
            ]
        );
    }

    #[test]
    fn resolved_unresolved_and_external_references() {
        let resolver = resolver();

        assert_eq!(
            resolver.resolve(ReferenceKind::Asset, &Reference::codename("banner")),
            json!({"id": "a-1", "codename": "banner"})
        );
        assert_eq!(
            resolver.resolve(ReferenceKind::Asset, &Reference::codename("logo")),
            json!({"external_id": "non-existent-asset-logo"})
        );
        assert_eq!(
            resolver.resolve(ReferenceKind::Item, &Reference::external_id("kept")),
            json!({"external_id": "kept"})
        );
    }

    #[test]
    fn rewrites_add_payload() {
        let element = asset_element("hero", vec![Reference::codename("banner"), Reference::codename("logo")]);
        let mut payload = serde_json::to_value(content_type("article", vec![element])).unwrap();

        resolver().rewrite_value(&mut payload);

        let element = &payload["elements"][0];
        assert_eq!(
            element["default"]["global"]["value"],
            json!([{"id": "a-1", "codename": "banner"}, {"external_id": "non-existent-asset-logo"}])
        );
        assert_eq!(
            element["guidelines"],
            json!(r#"<p>See <a data-item-external-id="non-existent-item-style_guide">this</a></p>"#)
        );
    }

    #[test]
    fn rewrites_replaced_default_using_element_kind() {
        let elements = vec![asset_element("hero", Vec::new())];
        let mut ops = vec![PatchOperation::replace(
            "/elements/codename:hero/default",
            &json!({"global": {"value": [{"codename": "banner"}]}}),
            &Value::Null,
        )];

        resolver().rewrite_operations(&mut ops, &elements);

        assert_eq!(
            ops[0].value(),
            Some(&json!({"global": {"value": [{"id": "a-1", "codename": "banner"}]}}))
        );
    }

    #[test]
    fn required_references_checked_against_synced_kinds() {
        let source = SyncModel {
            content_types: vec![content_type(
                "article",
                vec![taxonomy_element("tags", "topics"), rich_text_element("body", &["page"])],
            )],
            languages: vec![language("de", false, Some("en"))],
            ..SyncModel::default()
        };
        let target = SyncModel {
            languages: vec![language("en", true, None)],
            ..sample_model()
        };

        let err = verify_required(&source, &target, &EntityFilter::all()).unwrap_err();
        let Error::UnresolvedReference { missing } = err else {
            panic!("expected unresolved reference error");
        };
        let missing: Vec<_> = missing.iter().map(|m| (m.kind, m.codename.as_str())).collect();
        assert_eq!(
            missing,
            vec![
                (EntityKind::Languages, "en"),
                (EntityKind::Taxonomies, "topics"),
                (EntityKind::ContentTypes, "page"),
            ]
        );

        let only_types = EntityFilter::only([EntityKind::ContentTypes]);
        let err = verify_required(&source, &target, &only_types).unwrap_err();
        assert!(err.to_string().contains("page"));
    }

    #[test]
    fn complete_model_verifies() {
        let model = sample_model();
        assert!(verify_required(&model, &SyncModel::default(), &EntityFilter::all()).is_ok());
        let mut orphan = model.clone();
        orphan.content_types[0].elements.push(text_element("extra"));
        orphan.web_spotlight.root_type = Some(CodenameRef::new("missing"));
        assert!(verify_required(&orphan, &model, &EntityFilter::all()).is_err());
    }
}
