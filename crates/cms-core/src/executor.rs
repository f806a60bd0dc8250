//! Staged application of a Diff Model
//!
//! The executor walks a [`SyncPlan`] and turns each step into calls on a
//! [`ManagementClient`], one unit of work at a time. Types and snippets
//! added in the same run may reference each other, so they are first
//! created as skeletons without those references and patched afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use cms_diff::{DiffModel, PatchOperation, WebSpotlightChange, adjust, diff_content_type, diff_snippet};
use cms_model::{ContentType, ContentTypeSnippet, Element, EntityKind, Keyed, SyncModel};
use serde::Serialize;

use crate::client::{ClientResult, ManagementClient};
use crate::engine::{SyncOptions, SyncReport};
use crate::error::{Error, Result};
use crate::plan::{SyncPlan, SyncStep};
use crate::resolver::ReferenceResolver;

/// Singular label of an entity kind, for report lines
fn label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::ContentTypes => "content type",
        EntityKind::ContentTypeSnippets => "snippet",
        EntityKind::Taxonomies => "taxonomy group",
        EntityKind::Collections => "collection",
        EntityKind::AssetFolders => "asset folder",
        EntityKind::Spaces => "space",
        EntityKind::Languages => "language",
        EntityKind::WebSpotlight => "Web Spotlight",
    }
}

/// An added entity as first created, and the operations that complete it
#[derive(Debug, Clone)]
pub struct Skeleton<T> {
    pub entity: T,
    pub follow_up: Vec<PatchOperation>,
}

/// Skeletons of the types and snippets a diff adds
#[derive(Debug, Clone, Default)]
pub struct Skeletons {
    pub snippets: Vec<Skeleton<ContentTypeSnippet>>,
    pub types: Vec<Skeleton<ContentType>>,
}

impl Skeletons {
    pub fn prepare(diff: &DiffModel) -> Self {
        let added_types: BTreeSet<&str> = diff.content_types.added.iter().map(Keyed::codename).collect();
        let added_snippets: BTreeSet<&str> = diff
            .content_type_snippets
            .added
            .iter()
            .map(Keyed::codename)
            .collect();

        let snippets = diff
            .content_type_snippets
            .added
            .iter()
            .map(|full| {
                let mut entity = full.clone();
                strip_forward_references(&mut entity.elements, &added_types, &added_snippets);
                let follow_up = adjust(diff_snippet(full, &entity));
                Skeleton { entity, follow_up }
            })
            .collect();
        let types = diff
            .content_types
            .added
            .iter()
            .map(|full| {
                let mut entity = full.clone();
                strip_forward_references(&mut entity.elements, &added_types, &added_snippets);
                entity.prune_dangling_group_refs();
                let follow_up = adjust(diff_content_type(full, &entity));
                Skeleton { entity, follow_up }
            })
            .collect();

        Self { snippets, types }
    }
}

/// Drop elements that depend on an added snippet and allowed-type entries
/// naming an added type
fn strip_forward_references(elements: &mut Vec<Element>, types: &BTreeSet<&str>, snippets: &BTreeSet<&str>) {
    elements.retain(|e| !e.data.snippet_dependency().is_some_and(|s| snippets.contains(s)));
    for element in elements.iter_mut() {
        for (_, list) in element.data.type_reference_lists_mut() {
            list.retain(|r| !types.contains(r.codename.as_str()));
        }
    }
}

/// Runs the steps of a plan against a client, collecting a [`SyncReport`]
pub struct SyncExecutor<'a, C: ?Sized> {
    client: &'a C,
    resolver: &'a ReferenceResolver,
    options: &'a SyncOptions,
    report: SyncReport,
}

impl<'a, C: ManagementClient + ?Sized> SyncExecutor<'a, C> {
    pub fn new(client: &'a C, resolver: &'a ReferenceResolver, options: &'a SyncOptions) -> Self {
        Self {
            client,
            resolver,
            options,
            report: SyncReport::success(),
        }
    }

    /// Apply `diff` step by step.
    ///
    /// `source` is the model the diff was computed from; type and snippet
    /// updates take their element kinds from it.
    pub async fn execute(mut self, plan: &SyncPlan, diff: &DiffModel, source: &SyncModel) -> Result<SyncReport> {
        let skeletons = Skeletons::prepare(diff);

        for step in plan.steps() {
            tracing::info!(step = %step, "Running sync step");
            self.run_step(*step, diff, source, &skeletons).await?;
        }

        Ok(self.report.finish())
    }

    async fn run_step(
        &mut self,
        step: SyncStep,
        diff: &DiffModel,
        source: &SyncModel,
        skeletons: &Skeletons,
    ) -> Result<()> {
        match step {
            SyncStep::Collections => {
                self.add_all(EntityKind::Collections, &diff.collections.added).await?;
                self.update_all(EntityKind::Collections, &diff.collections.updated).await?;
                self.reorder(EntityKind::Collections, &diff.collections.order).await
            }
            SyncStep::Languages => {
                self.add_all(EntityKind::Languages, &diff.languages.added).await?;
                self.update_all(EntityKind::Languages, &diff.languages.updated).await?;
                self.reorder(EntityKind::Languages, &diff.languages.order).await
            }
            SyncStep::Spaces => {
                self.add_all(EntityKind::Spaces, &diff.spaces.added).await?;
                self.update_all(EntityKind::Spaces, &diff.spaces.updated).await
            }
            SyncStep::AssetFolders => {
                if diff.asset_folders.is_empty() {
                    return Ok(());
                }
                let client = self.client;
                let ops = &diff.asset_folders;
                self.unit(format!("patch the asset folder tree ({} operations)", ops.len()), || {
                    client.patch_list(EntityKind::AssetFolders, ops)
                })
                .await
            }
            SyncStep::Taxonomies => {
                self.add_all(EntityKind::Taxonomies, &diff.taxonomies.added).await?;
                self.update_all(EntityKind::Taxonomies, &diff.taxonomies.updated).await
            }
            SyncStep::SnippetSkeletons => {
                let snippets = skeletons.snippets.iter().map(|s| &s.entity);
                self.add_all(EntityKind::ContentTypeSnippets, snippets).await
            }
            SyncStep::TypeSkeletons => {
                let types = skeletons.types.iter().map(|s| &s.entity);
                self.add_all(EntityKind::ContentTypes, types).await
            }
            SyncStep::SnippetReferences => {
                for skeleton in &skeletons.snippets {
                    let full = source.snippet(&skeleton.entity.codename);
                    let elements = full.map(|s| s.elements.as_slice()).unwrap_or_default();
                    self.update(
                        EntityKind::ContentTypeSnippets,
                        &skeleton.entity.codename,
                        &skeleton.follow_up,
                        elements,
                    )
                    .await?;
                }
                Ok(())
            }
            SyncStep::TypeReferencesAndUpdates => {
                for skeleton in &skeletons.types {
                    let full = source.content_type(&skeleton.entity.codename);
                    let elements = full.map(|t| t.elements.as_slice()).unwrap_or_default();
                    self.update(EntityKind::ContentTypes, &skeleton.entity.codename, &skeleton.follow_up, elements)
                        .await?;
                }
                for (codename, ops) in &diff.content_types.updated {
                    let full = source.content_type(codename);
                    let elements = full.map(|t| t.elements.as_slice()).unwrap_or_default();
                    self.update(EntityKind::ContentTypes, codename, ops, elements).await?;
                }
                Ok(())
            }
            SyncStep::WebSpotlight => self.web_spotlight(&diff.web_spotlight).await,
            SyncStep::TypeDeletions => self.delete_all(EntityKind::ContentTypes, &diff.content_types.deleted).await,
            SyncStep::SnippetDeletions => {
                self.delete_all(EntityKind::ContentTypeSnippets, &diff.content_type_snippets.deleted)
                    .await
            }
            SyncStep::SnippetUpdates => {
                for (codename, ops) in &diff.content_type_snippets.updated {
                    let full = source.snippet(codename);
                    let elements = full.map(|s| s.elements.as_slice()).unwrap_or_default();
                    self.update(EntityKind::ContentTypeSnippets, codename, ops, elements).await?;
                }
                Ok(())
            }
            SyncStep::TaxonomyDeletions => self.delete_all(EntityKind::Taxonomies, &diff.taxonomies.deleted).await,
            SyncStep::SpaceDeletions => self.delete_all(EntityKind::Spaces, &diff.spaces.deleted).await,
            SyncStep::CollectionDeletions => self.delete_all(EntityKind::Collections, &diff.collections.deleted).await,
            SyncStep::LanguageDeletions => self.delete_all(EntityKind::Languages, &diff.languages.deleted).await,
        }
    }

    async fn add_all<'i, T>(&mut self, kind: EntityKind, items: impl IntoIterator<Item = &'i T>) -> Result<()>
    where
        T: Keyed + Serialize + 'i,
    {
        for item in items {
            let mut payload = serde_json::to_value(item)?;
            self.resolver.rewrite_value(&mut payload);

            let client = self.client;
            self.unit(format!("add {} `{}`", label(kind), item.codename()), move || {
                client.add_entity(kind, payload)
            })
            .await?;
        }
        Ok(())
    }

    async fn update_all(&mut self, kind: EntityKind, updated: &BTreeMap<String, Vec<PatchOperation>>) -> Result<()> {
        for (codename, ops) in updated {
            self.update(kind, codename, ops, &[]).await?;
        }
        Ok(())
    }

    async fn update(
        &mut self,
        kind: EntityKind,
        codename: &str,
        ops: &[PatchOperation],
        elements: &[Element],
    ) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let mut ops = ops.to_vec();
        self.resolver.rewrite_operations(&mut ops, elements);
        for op in &ops {
            tracing::debug!(kind = %kind, codename = %codename, operation = %op, "Patch operation");
        }

        let client = self.client;
        let action = format!("update {} `{}` ({} operations)", label(kind), codename, ops.len());
        self.unit(action, || client.patch_entity(kind, codename, &ops)).await
    }

    async fn reorder(&mut self, kind: EntityKind, moves: &[PatchOperation]) -> Result<()> {
        if moves.is_empty() {
            return Ok(());
        }
        let client = self.client;
        self.unit(format!("reorder {} ({} moves)", kind, moves.len()), || {
            client.patch_list(kind, moves)
        })
        .await
    }

    async fn delete_all(&mut self, kind: EntityKind, codenames: &BTreeSet<String>) -> Result<()> {
        for codename in codenames {
            let client = self.client;
            self.unit(format!("delete {} `{}`", label(kind), codename), || {
                client.delete_entity(kind, codename)
            })
            .await?;
        }
        Ok(())
    }

    async fn web_spotlight(&mut self, change: &WebSpotlightChange) -> Result<()> {
        let client = self.client;
        match change {
            WebSpotlightChange::None => Ok(()),
            WebSpotlightChange::Activate { root_type_codename } | WebSpotlightChange::ChangeRootType { root_type_codename } => {
                let root = root_type_codename.as_str();
                let action = match change {
                    WebSpotlightChange::Activate { .. } => format!("activate Web Spotlight with root type `{}`", root),
                    _ => format!("change the Web Spotlight root type to `{}`", root),
                };
                self.unit(action, || async move {
                    let id = client.entity_id(EntityKind::ContentTypes, root).await?;
                    client.activate_web_spotlight(&id).await
                })
                .await
            }
            WebSpotlightChange::Deactivate => {
                self.unit("deactivate Web Spotlight".to_string(), || client.deactivate_web_spotlight())
                    .await
            }
        }
    }

    /// Run one unit of work.
    ///
    /// Under `dry_run` the call is never made. A failure aborts the run
    /// unless `continue_on_error` is set, in which case it is recorded.
    async fn unit<T, F, Fut>(&mut self, action: String, call: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if self.options.dry_run {
            self.report.actions.push(format!("[dry-run] Would {}", action));
            return Ok(());
        }

        tracing::debug!(action = %action, "Applying");
        match call().await {
            Ok(_) => {
                self.report.actions.push(action);
                Ok(())
            }
            Err(source) if self.options.continue_on_error => {
                tracing::warn!(action = %action, error = %source, "Unit of work failed; continuing");
                self.report.record_error(format!("{}: {}", action, source));
                Ok(())
            }
            Err(source) => {
                tracing::error!(action = %action, error = %source, "Unit of work failed");
                Err(Error::Apply { unit: action, source })
            }
        }
    }
}
