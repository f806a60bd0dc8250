//! Entity and element builders with sensible defaults.
//!
//! Display names are derived from codenames so fixtures stay short; tests
//! that care about names set them explicitly.

use cms_model::element::{
    CustomElement, LinkedItemsElement, MultipleChoiceElement, MultipleChoiceOption, NumberElement,
    RichTextElement, SnippetElement, TaxonomyElement, TextElement, UrlSlugDependency, UrlSlugElement,
};
use cms_model::{
    AssetFolder, CodenameRef, Collection, ContentGroup, ContentType, ContentTypeSnippet, Element,
    ElementData, Language, Reference, Space, SyncModel, TaxonomyGroup, TaxonomyTerm, WebSpotlight,
};

/// `article_page` becomes `Article page`
pub fn display_name(codename: &str) -> String {
    let spaced = codename.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn refs(codenames: &[&str]) -> Vec<CodenameRef> {
    codenames.iter().map(|c| CodenameRef::new(*c)).collect()
}

pub fn text_element(codename: &str) -> Element {
    Element::new(
        codename,
        ElementData::Text(TextElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            maximum_length: None,
            validation_regex: None,
            default: None,
        }),
    )
}

pub fn number_element(codename: &str) -> Element {
    Element::new(
        codename,
        ElementData::Number(NumberElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            default: None,
        }),
    )
}

pub fn rich_text_element(codename: &str, allowed_types: &[&str]) -> Element {
    Element::new(
        codename,
        ElementData::RichText(RichTextElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            maximum_text_length: None,
            maximum_image_size: None,
            allowed_content_types: refs(allowed_types),
            allowed_item_link_types: Vec::new(),
            allowed_blocks: Vec::new(),
            allowed_formatting: Vec::new(),
        }),
    )
}

pub fn custom_element(codename: &str, source_url: &str) -> Element {
    Element::new(
        codename,
        ElementData::Custom(CustomElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            source_url: source_url.into(),
            json_parameters: None,
            allowed_elements: Vec::new(),
        }),
    )
}

pub fn taxonomy_element(codename: &str, group: &str) -> Element {
    Element::new(
        codename,
        ElementData::Taxonomy(TaxonomyElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            taxonomy_group: CodenameRef::new(group),
            term_count_limit: None,
            default: None,
        }),
    )
}

pub fn linked_items_element(codename: &str, allowed_types: &[&str]) -> Element {
    Element::new(
        codename,
        ElementData::LinkedItems(LinkedItemsElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            allowed_content_types: refs(allowed_types),
            item_count_limit: None,
            default: None,
        }),
    )
}

pub fn multiple_choice_element(codename: &str, options: &[&str]) -> Element {
    Element::new(
        codename,
        ElementData::MultipleChoice(MultipleChoiceElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            mode: "single".into(),
            options: options
                .iter()
                .map(|o| MultipleChoiceOption {
                    name: display_name(o),
                    codename: o.to_string(),
                    external_id: None,
                })
                .collect(),
            default: None,
        }),
    )
}

pub fn url_slug_element(codename: &str, depends_on: &str, snippet: Option<&str>) -> Element {
    Element::new(
        codename,
        ElementData::UrlSlug(UrlSlugElement {
            name: display_name(codename),
            guidelines: None,
            is_required: false,
            is_non_localizable: false,
            depends_on: UrlSlugDependency {
                element: CodenameRef::new(depends_on),
                snippet: snippet.map(CodenameRef::new),
            },
            validation_regex: None,
        }),
    )
}

pub fn snippet_element(codename: &str, snippet: &str) -> Element {
    Element::new(
        codename,
        ElementData::Snippet(SnippetElement {
            snippet: CodenameRef::new(snippet),
        }),
    )
}

pub fn content_type(codename: &str, elements: Vec<Element>) -> ContentType {
    ContentType {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        content_groups: Vec::new(),
        elements,
    }
}

pub fn content_group(codename: &str) -> ContentGroup {
    ContentGroup {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
    }
}

pub fn snippet(codename: &str, elements: Vec<Element>) -> ContentTypeSnippet {
    ContentTypeSnippet {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        elements,
    }
}

pub fn taxonomy(codename: &str, terms: Vec<TaxonomyTerm>) -> TaxonomyGroup {
    TaxonomyGroup {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        terms,
    }
}

pub fn term(codename: &str, terms: Vec<TaxonomyTerm>) -> TaxonomyTerm {
    TaxonomyTerm {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        terms,
    }
}

pub fn asset_folder(codename: &str, folders: Vec<AssetFolder>) -> AssetFolder {
    AssetFolder {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        folders,
    }
}

pub fn collection(codename: &str) -> Collection {
    Collection {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
    }
}

pub fn language(codename: &str, is_default: bool, fallback: Option<&str>) -> Language {
    Language {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        is_active: true,
        is_default,
        fallback_language: fallback.map(CodenameRef::new),
    }
}

pub fn space(codename: &str, root_item: Option<&str>, collections: &[&str]) -> Space {
    Space {
        name: display_name(codename),
        codename: codename.into(),
        external_id: None,
        web_spotlight_root_item: root_item.map(Reference::codename),
        collections: refs(collections),
    }
}

/// A small but complete model touching every entity kind.
///
/// Contains a snippet referenced from a type, a type referencing another
/// type, grouped elements, a two-level taxonomy and asset folder tree, and
/// Web Spotlight enabled on `page`.
pub fn sample_model() -> SyncModel {
    let mut article = content_type(
        "article",
        vec![
            text_element("title").in_group("content"),
            rich_text_element("body", &["page"]).in_group("content"),
            taxonomy_element("tags", "topics").in_group("content"),
            snippet_element("seo", "seo_fields").in_group("metadata"),
            url_slug_element("slug", "title", None).in_group("metadata"),
        ],
    );
    article.content_groups = vec![content_group("content"), content_group("metadata")];

    SyncModel {
        content_types: vec![
            article,
            content_type(
                "page",
                vec![
                    text_element("title"),
                    linked_items_element("related", &["article", "page"]),
                    multiple_choice_element("layout", &["wide", "narrow"]),
                ],
            ),
        ],
        content_type_snippets: vec![snippet(
            "seo_fields",
            vec![text_element("meta_title"), text_element("meta_description")],
        )],
        taxonomies: vec![taxonomy(
            "topics",
            vec![term("tech", vec![term("rust", vec![]), term("web", vec![])]), term("life", vec![])],
        )],
        collections: vec![collection("default"), collection("marketing")],
        asset_folders: vec![asset_folder("images", vec![asset_folder("icons", vec![])]), asset_folder("docs", vec![])],
        spaces: vec![space("website", None, &["default", "marketing"])],
        languages: vec![language("en", true, None), language("de", false, Some("en"))],
        web_spotlight: WebSpotlight {
            enabled: true,
            root_type: Some(CodenameRef::new("page")),
        },
    }
}
