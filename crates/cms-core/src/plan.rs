//! The fixed sequence of sync steps

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a sync.
///
/// Declaration order is the standard execution order: everything an entity
/// may reference is created before it, and nothing is deleted while a
/// remaining entity may still reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStep {
    Collections,
    Languages,
    Spaces,
    AssetFolders,
    Taxonomies,
    /// Added snippets without references to types or snippets added in the same run
    SnippetSkeletons,
    /// Added types without references to types or snippets added in the same run
    TypeSkeletons,
    /// The references stripped from snippet skeletons
    SnippetReferences,
    /// The references stripped from type skeletons, then updates to existing types
    TypeReferencesAndUpdates,
    WebSpotlight,
    TypeDeletions,
    SnippetDeletions,
    /// Updates to existing snippets, once no deleted type still uses them
    SnippetUpdates,
    TaxonomyDeletions,
    SpaceDeletions,
    CollectionDeletions,
    LanguageDeletions,
}

impl SyncStep {
    pub const STANDARD: [SyncStep; 17] = [
        SyncStep::Collections,
        SyncStep::Languages,
        SyncStep::Spaces,
        SyncStep::AssetFolders,
        SyncStep::Taxonomies,
        SyncStep::SnippetSkeletons,
        SyncStep::TypeSkeletons,
        SyncStep::SnippetReferences,
        SyncStep::TypeReferencesAndUpdates,
        SyncStep::WebSpotlight,
        SyncStep::TypeDeletions,
        SyncStep::SnippetDeletions,
        SyncStep::SnippetUpdates,
        SyncStep::TaxonomyDeletions,
        SyncStep::SpaceDeletions,
        SyncStep::CollectionDeletions,
        SyncStep::LanguageDeletions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::Languages => "languages",
            Self::Spaces => "spaces",
            Self::AssetFolders => "asset folders",
            Self::Taxonomies => "taxonomies",
            Self::SnippetSkeletons => "snippet skeletons",
            Self::TypeSkeletons => "content type skeletons",
            Self::SnippetReferences => "snippet references",
            Self::TypeReferencesAndUpdates => "content type references and updates",
            Self::WebSpotlight => "web spotlight",
            Self::TypeDeletions => "content type deletions",
            Self::SnippetDeletions => "snippet deletions",
            Self::SnippetUpdates => "snippet updates",
            Self::TaxonomyDeletions => "taxonomy deletions",
            Self::SpaceDeletions => "space deletions",
            Self::CollectionDeletions => "collection deletions",
            Self::LanguageDeletions => "language deletions",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered steps a [`SyncExecutor`](crate::SyncExecutor) runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    steps: Vec<SyncStep>,
}

impl SyncPlan {
    pub fn standard() -> Self {
        Self {
            steps: SyncStep::STANDARD.to_vec(),
        }
    }

    pub fn steps(&self) -> &[SyncStep] {
        &self.steps
    }
}

impl Default for SyncPlan {
    fn default() -> Self {
        Self::standard()
    }
}
