//! Polymorphic content type elements
//!
//! An [`Element`] carries the fields every element kind shares (codename,
//! external id, content group membership) and a kind specific payload in
//! [`ElementData`], tagged by `type` on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::ReferenceKind;
use crate::reference::{CodenameRef, Reference};

/// An element of a content type or content type snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_group: Option<CodenameRef>,
    #[serde(flatten)]
    pub data: ElementData,
}

impl Element {
    pub fn new(codename: impl Into<String>, data: ElementData) -> Self {
        Self {
            codename: codename.into(),
            external_id: None,
            content_group: None,
            data,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.content_group = Some(CodenameRef::new(group));
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }
}

/// Discriminator of [`ElementData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Number,
    Asset,
    RichText,
    Taxonomy,
    MultipleChoice,
    DateTime,
    UrlSlug,
    Guidelines,
    Custom,
    LinkedItems,
    Subpages,
    Snippet,
}

impl ElementKind {
    /// The `type` tag used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Asset => "asset",
            Self::RichText => "rich_text",
            Self::Taxonomy => "taxonomy",
            Self::MultipleChoice => "multiple_choice",
            Self::DateTime => "date_time",
            Self::UrlSlug => "url_slug",
            Self::Guidelines => "guidelines",
            Self::Custom => "custom",
            Self::LinkedItems => "modular_content",
            Self::Subpages => "subpages",
            Self::Snippet => "snippet",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "text" => Self::Text,
            "number" => Self::Number,
            "asset" => Self::Asset,
            "rich_text" => Self::RichText,
            "taxonomy" => Self::Taxonomy,
            "multiple_choice" => Self::MultipleChoice,
            "date_time" => Self::DateTime,
            "url_slug" => Self::UrlSlug,
            "guidelines" => Self::Guidelines,
            "custom" => Self::Custom,
            "modular_content" => Self::LinkedItems,
            "subpages" => Self::Subpages,
            "snippet" => Self::Snippet,
            _ => return None,
        })
    }

    /// Kind of entity referenced from this element's default value, if any
    pub fn default_reference_kind(&self) -> Option<ReferenceKind> {
        match self {
            Self::Asset => Some(ReferenceKind::Asset),
            Self::LinkedItems | Self::Subpages => Some(ReferenceKind::Item),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind specific element payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementData {
    Text(TextElement),
    Number(NumberElement),
    Asset(AssetElement),
    RichText(RichTextElement),
    Taxonomy(TaxonomyElement),
    MultipleChoice(MultipleChoiceElement),
    DateTime(DateTimeElement),
    UrlSlug(UrlSlugElement),
    Guidelines(GuidelinesElement),
    Custom(CustomElement),
    #[serde(rename = "modular_content")]
    LinkedItems(LinkedItemsElement),
    Subpages(LinkedItemsElement),
    Snippet(SnippetElement),
}

impl ElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Number(_) => ElementKind::Number,
            Self::Asset(_) => ElementKind::Asset,
            Self::RichText(_) => ElementKind::RichText,
            Self::Taxonomy(_) => ElementKind::Taxonomy,
            Self::MultipleChoice(_) => ElementKind::MultipleChoice,
            Self::DateTime(_) => ElementKind::DateTime,
            Self::UrlSlug(_) => ElementKind::UrlSlug,
            Self::Guidelines(_) => ElementKind::Guidelines,
            Self::Custom(_) => ElementKind::Custom,
            Self::LinkedItems(_) => ElementKind::LinkedItems,
            Self::Subpages(_) => ElementKind::Subpages,
            Self::Snippet(_) => ElementKind::Snippet,
        }
    }

    /// Shared fields of kinds that have a display name
    pub fn named(&self) -> Option<&dyn NamedElement> {
        match self {
            Self::Text(e) => Some(e),
            Self::Number(e) => Some(e),
            Self::Asset(e) => Some(e),
            Self::RichText(e) => Some(e),
            Self::Taxonomy(e) => Some(e),
            Self::MultipleChoice(e) => Some(e),
            Self::DateTime(e) => Some(e),
            Self::UrlSlug(e) => Some(e),
            Self::Custom(e) => Some(e),
            Self::LinkedItems(e) | Self::Subpages(e) => Some(e),
            Self::Guidelines(_) | Self::Snippet(_) => None,
        }
    }

    /// Guidelines HTML of this element, wherever the kind keeps it
    pub fn guidelines(&self) -> Option<&str> {
        match self {
            Self::Guidelines(e) => Some(&e.guidelines),
            other => other.named().and_then(|n| n.guidelines().as_deref()),
        }
    }

    /// Codenames of content types and snippets this element points at
    pub fn type_references(&self) -> Vec<&str> {
        match self {
            Self::RichText(e) => e
                .allowed_content_types
                .iter()
                .chain(&e.allowed_item_link_types)
                .map(|r| r.codename.as_str())
                .collect(),
            Self::LinkedItems(e) | Self::Subpages(e) => e
                .allowed_content_types
                .iter()
                .map(|r| r.codename.as_str())
                .collect(),
            Self::Snippet(e) => vec![e.snippet.codename.as_str()],
            Self::UrlSlug(e) => e
                .depends_on
                .snippet
                .iter()
                .map(|r| r.codename.as_str())
                .collect(),
            Self::Text(_)
            | Self::Number(_)
            | Self::Asset(_)
            | Self::Taxonomy(_)
            | Self::MultipleChoice(_)
            | Self::DateTime(_)
            | Self::Guidelines(_)
            | Self::Custom(_) => Vec::new(),
        }
    }

    /// List-valued fields holding content type references, by field name
    pub fn type_reference_lists_mut(&mut self) -> Vec<(&'static str, &mut Vec<CodenameRef>)> {
        match self {
            Self::RichText(e) => vec![
                ("allowed_content_types", &mut e.allowed_content_types),
                ("allowed_item_link_types", &mut e.allowed_item_link_types),
            ],
            Self::LinkedItems(e) | Self::Subpages(e) => {
                vec![("allowed_content_types", &mut e.allowed_content_types)]
            }
            _ => Vec::new(),
        }
    }

    /// Snippet this element cannot exist without
    pub fn snippet_dependency(&self) -> Option<&str> {
        match self {
            Self::Snippet(e) => Some(&e.snippet.codename),
            Self::UrlSlug(e) => e.depends_on.snippet.as_ref().map(|s| s.codename.as_str()),
            _ => None,
        }
    }

    /// Item or asset references held in the default value
    pub fn default_references(&self) -> Vec<(ReferenceKind, &Reference)> {
        let (kind, default) = match self {
            Self::Asset(e) => (ReferenceKind::Asset, &e.default),
            Self::LinkedItems(e) | Self::Subpages(e) => (ReferenceKind::Item, &e.default),
            _ => return Vec::new(),
        };
        default
            .iter()
            .flat_map(|d| d.global.value.iter())
            .map(|r| (kind, r))
            .collect()
    }
}

/// Fields shared by every element kind that has a display name
pub trait NamedElement {
    fn name(&self) -> &String;
    fn guidelines(&self) -> &Option<String>;
    fn is_required(&self) -> &bool;
    fn is_non_localizable(&self) -> &bool;
}

macro_rules! impl_named_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NamedElement for $ty {
                fn name(&self) -> &String {
                    &self.name
                }
                fn guidelines(&self) -> &Option<String> {
                    &self.guidelines
                }
                fn is_required(&self) -> &bool {
                    &self.is_required
                }
                fn is_non_localizable(&self) -> &bool {
                    &self.is_non_localizable
                }
            }
        )*
    };
}

impl_named_element!(
    TextElement,
    NumberElement,
    AssetElement,
    RichTextElement,
    TaxonomyElement,
    MultipleChoiceElement,
    DateTimeElement,
    UrlSlugElement,
    CustomElement,
    LinkedItemsElement,
);

/// `{"global": {"value": ...}}` default value wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultValue<T> {
    pub global: GlobalDefault<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalDefault<T> {
    pub value: T,
}

impl<T> DefaultValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            global: GlobalDefault { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLengthLimit {
    pub value: u32,
    pub applies_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountLimit {
    pub value: u32,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRegex {
    pub regex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<TextLengthLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<ValidationRegex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_count_limit: Option<CountLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_file_types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<Vec<Reference>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_text_length: Option<TextLengthLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_image_size: Option<u64>,
    #[serde(default)]
    pub allowed_content_types: Vec<CodenameRef>,
    #[serde(default)]
    pub allowed_item_link_types: Vec<CodenameRef>,
    #[serde(default)]
    pub allowed_blocks: Vec<String>,
    #[serde(default)]
    pub allowed_formatting: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    pub taxonomy_group: CodenameRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_count_limit: Option<CountLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<Vec<CodenameRef>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceOption {
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    pub mode: String,
    #[serde(default)]
    pub options: Vec<MultipleChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<Vec<CodenameRef>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlSlugDependency {
    pub element: CodenameRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<CodenameRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSlugElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    pub depends_on: UrlSlugDependency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<ValidationRegex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelinesElement {
    pub guidelines: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_parameters: Option<String>,
    #[serde(default)]
    pub allowed_elements: Vec<CodenameRef>,
}

/// Payload of both linked-items (`modular_content`) and `subpages` elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedItemsElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_non_localizable: bool,
    #[serde(default)]
    pub allowed_content_types: Vec<CodenameRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count_limit: Option<CountLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue<Vec<Reference>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetElement {
    pub snippet: CodenameRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn element_round_trips_through_wire_shape() {
        let wire = json!({
            "codename": "related",
            "content_group": {"codename": "main"},
            "type": "modular_content",
            "name": "Related articles",
            "is_required": false,
            "is_non_localizable": false,
            "allowed_content_types": [{"codename": "article"}],
            "default": {"global": {"value": [{"codename": "launch_post"}]}}
        });

        let element: Element = serde_json::from_value(wire).unwrap();
        assert_eq!(element.kind(), ElementKind::LinkedItems);
        assert_eq!(element.data.type_references(), vec!["article"]);

        let back = serde_json::to_value(&element).unwrap();
        assert_eq!(back["type"], json!("modular_content"));
        assert_eq!(back["content_group"], json!({"codename": "main"}));
    }

    #[test]
    fn snippet_element_has_no_name() {
        let element: Element = serde_json::from_value(json!({
            "codename": "seo",
            "type": "snippet",
            "snippet": {"codename": "seo_fields"}
        }))
        .unwrap();

        assert!(element.data.named().is_none());
        assert_eq!(element.data.snippet_dependency(), Some("seo_fields"));
    }

    #[test]
    fn default_references_are_tagged_by_kind() {
        let element: Element = serde_json::from_value(json!({
            "codename": "hero",
            "type": "asset",
            "name": "Hero",
            "default": {"global": {"value": [{"codename": "banner"}, {"external_id": "x"}]}}
        }))
        .unwrap();

        let refs = element.data.default_references();
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|(kind, _)| *kind == ReferenceKind::Asset));
    }

    #[test]
    fn kind_tags_round_trip() {
        for tag in [
            "text",
            "number",
            "asset",
            "rich_text",
            "taxonomy",
            "multiple_choice",
            "date_time",
            "url_slug",
            "guidelines",
            "custom",
            "modular_content",
            "subpages",
            "snippet",
        ] {
            let kind = ElementKind::from_tag(tag).unwrap();
            assert_eq!(kind.as_str(), tag);
        }
        assert_eq!(ElementKind::from_tag("component"), None);
    }
}
