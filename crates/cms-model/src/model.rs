//! The normalized, comparable Sync Model

use serde::{Deserialize, Serialize};

use crate::entity::{
    AssetFolder, Collection, ContentType, ContentTypeSnippet, Language, Space, TaxonomyGroup,
    WebSpotlight,
};
use crate::kind::{EntityFilter, EntityKind};

/// Id-free representation of an environment's content model.
///
/// Every cross-entity reference carries a codename, or an external id for
/// content items and assets that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncModel {
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub content_type_snippets: Vec<ContentTypeSnippet>,
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyGroup>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub asset_folders: Vec<AssetFolder>,
    #[serde(default)]
    pub spaces: Vec<Space>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub web_spotlight: WebSpotlight,
}

impl SyncModel {
    pub fn content_type(&self, codename: &str) -> Option<&ContentType> {
        self.content_types.iter().find(|t| t.codename == codename)
    }

    pub fn snippet(&self, codename: &str) -> Option<&ContentTypeSnippet> {
        self.content_type_snippets.iter().find(|s| s.codename == codename)
    }

    pub fn taxonomy(&self, codename: &str) -> Option<&TaxonomyGroup> {
        self.taxonomies.iter().find(|t| t.codename == codename)
    }

    pub fn collection(&self, codename: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.codename == codename)
    }

    pub fn language(&self, codename: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.codename == codename)
    }

    pub fn space(&self, codename: &str) -> Option<&Space> {
        self.spaces.iter().find(|s| s.codename == codename)
    }

    /// Copy of this model with every kind outside `filter` emptied
    pub fn filtered(&self, filter: &EntityFilter) -> SyncModel {
        let mut model = self.clone();
        for kind in EntityKind::ALL {
            if filter.includes(kind) {
                continue;
            }
            match kind {
                EntityKind::ContentTypes => model.content_types.clear(),
                EntityKind::ContentTypeSnippets => model.content_type_snippets.clear(),
                EntityKind::Taxonomies => model.taxonomies.clear(),
                EntityKind::Collections => model.collections.clear(),
                EntityKind::AssetFolders => model.asset_folders.clear(),
                EntityKind::Spaces => model.spaces.clear(),
                EntityKind::Languages => model.languages.clear(),
                EntityKind::WebSpotlight => model.web_spotlight = WebSpotlight::default(),
            }
        }
        model
    }
}
