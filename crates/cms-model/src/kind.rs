//! Entity kinds and the `--entities` allow-list

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kinds of structural entity that can be synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    ContentTypes,
    ContentTypeSnippets,
    Taxonomies,
    Collections,
    AssetFolders,
    Spaces,
    Languages,
    WebSpotlight,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::ContentTypes,
        EntityKind::ContentTypeSnippets,
        EntityKind::Taxonomies,
        EntityKind::Collections,
        EntityKind::AssetFolders,
        EntityKind::Spaces,
        EntityKind::Languages,
        EntityKind::WebSpotlight,
    ];

    /// Name used on the command line and in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentTypes => "contentTypes",
            Self::ContentTypeSnippets => "contentTypeSnippets",
            Self::Taxonomies => "taxonomies",
            Self::Collections => "collections",
            Self::AssetFolders => "assetFolders",
            Self::Spaces => "spaces",
            Self::Languages => "languages",
            Self::WebSpotlight => "webSpotlight",
        }
    }

    /// File name of this kind inside a snapshot folder
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(EntityKind::as_str).collect();
                format!("unknown entity kind `{}` (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Allow-list of entity kinds taking part in a diff or sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityFilter(BTreeSet<EntityKind>);

impl EntityFilter {
    /// A filter that admits every kind
    pub fn all() -> Self {
        Self(EntityKind::ALL.into_iter().collect())
    }

    pub fn only(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn includes(&self, kind: EntityKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.0.iter().copied()
    }
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// Kinds of content entity that are migrated independently of the content
/// model and referenced from it by business key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Item,
    Asset,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Asset => "asset",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_cli_name() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "workflows".parse::<EntityKind>().unwrap_err();
        assert!(err.contains("workflows"));
        assert!(err.contains("contentTypes"));
    }

    #[test]
    fn filter_serializes_as_list() {
        let filter = EntityFilter::only([EntityKind::Languages, EntityKind::Collections]);
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"["collections","languages"]"#);
    }
}
