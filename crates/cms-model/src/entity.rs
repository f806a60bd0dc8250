//! Structural entities of a content model

use serde::{Deserialize, Serialize};

use crate::element::{Element, MultipleChoiceOption};
use crate::reference::{CodenameRef, Reference};

/// Anything addressed by codename inside a model or an array path
pub trait Keyed {
    fn codename(&self) -> &str;
}

macro_rules! impl_keyed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Keyed for $ty {
                fn codename(&self) -> &str {
                    &self.codename
                }
            }
        )*
    };
}

impl_keyed!(
    ContentType,
    ContentGroup,
    ContentTypeSnippet,
    Element,
    MultipleChoiceOption,
    TaxonomyGroup,
    TaxonomyTerm,
    AssetFolder,
    Collection,
    Language,
    Space,
    CodenameRef,
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentGroup {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub content_groups: Vec<ContentGroup>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl ContentType {
    pub fn element(&self, codename: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.codename == codename)
    }

    /// Clear element group memberships that no longer name an existing group.
    ///
    /// A type without groups has no memberships at all; removing the last
    /// group on the service has the same effect.
    pub fn prune_dangling_group_refs(&mut self) {
        let groups: Vec<&str> = self.content_groups.iter().map(|g| g.codename.as_str()).collect();
        for element in &mut self.elements {
            let dangling = element
                .content_group
                .as_ref()
                .is_some_and(|g| !groups.contains(&g.codename.as_str()));
            if dangling {
                element.content_group = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeSnippet {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl ContentTypeSnippet {
    pub fn element(&self, codename: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.codename == codename)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyGroup {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub terms: Vec<TaxonomyTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub terms: Vec<TaxonomyTerm>,
}

impl TaxonomyGroup {
    /// Every term codename in the tree, depth first
    pub fn term_codenames(&self) -> Vec<&str> {
        fn walk<'a>(terms: &'a [TaxonomyTerm], out: &mut Vec<&'a str>) {
            for term in terms {
                out.push(&term.codename);
                walk(&term.terms, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.terms, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFolder {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub folders: Vec<AssetFolder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_language: Option<CodenameRef>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_spotlight_root_item: Option<Reference>,
    #[serde(default)]
    pub collections: Vec<CodenameRef>,
}

/// The environment-wide Web Spotlight setting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSpotlight {
    pub enabled: bool,
    #[serde(default)]
    pub root_type: Option<CodenameRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementData, GuidelinesElement};
    use pretty_assertions::assert_eq;

    fn guidelines(codename: &str, group: Option<&str>) -> Element {
        let element = Element::new(
            codename,
            ElementData::Guidelines(GuidelinesElement {
                guidelines: String::new(),
            }),
        );
        match group {
            Some(g) => element.in_group(g),
            None => element,
        }
    }

    #[test]
    fn prune_clears_memberships_of_removed_groups() {
        let mut ty = ContentType {
            name: "Article".into(),
            codename: "article".into(),
            external_id: None,
            content_groups: vec![ContentGroup {
                name: "Main".into(),
                codename: "main".into(),
                external_id: None,
            }],
            elements: vec![guidelines("intro", Some("main")), guidelines("seo", Some("metadata"))],
        };

        ty.prune_dangling_group_refs();

        assert_eq!(ty.elements[0].content_group, Some(CodenameRef::new("main")));
        assert_eq!(ty.elements[1].content_group, None);
    }

    #[test]
    fn term_codenames_walks_depth_first() {
        let term = |codename: &str, terms: Vec<TaxonomyTerm>| TaxonomyTerm {
            name: codename.to_uppercase(),
            codename: codename.into(),
            external_id: None,
            terms,
        };
        let group = TaxonomyGroup {
            name: "Colors".into(),
            codename: "colors".into(),
            external_id: None,
            terms: vec![term("warm", vec![term("red", vec![])]), term("cold", vec![])],
        };

        assert_eq!(group.term_codenames(), vec!["warm", "red", "cold"]);
    }

    #[test]
    fn language_defaults_to_active() {
        let lang: Language =
            serde_json::from_value(serde_json::json!({"name": "English", "codename": "en"})).unwrap();
        assert!(lang.is_active);
        assert!(!lang.is_default);
    }
}
