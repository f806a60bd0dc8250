//! Element comparison
//!
//! Elements are compared through a [`Union`] on the element kind. Snippet
//! reference elements are compared as references only: the elements of
//! the referenced snippet belong to the snippet's own diff.

use cms_model::element::{
    AssetElement, CustomElement, DateTimeElement, GuidelinesElement, LinkedItemsElement,
    MultipleChoiceElement, MultipleChoiceOption, NumberElement, RichTextElement, SnippetElement,
    TaxonomyElement, TextElement, UrlSlugElement,
};
use cms_model::{CodenameRef, ContentType, Element, ElementData, NamedElement};

use crate::handler::{Constant, Context, Handler, Leaf, ObjectDiff, Optional};
use crate::handlers::{KeyedArray, Positional, Union};
use crate::operation::PatchOperation;

/// Element of a content type; group membership depends on the parent type
pub fn diff_type_element(
    source: &Element,
    target: &Element,
    context: Context<'_, ContentType>,
) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("codename", |e| &e.codename, Constant)
        .field("external_id", |e| &e.external_id, Constant)
        .field_in_context("content_group", |e| &e.content_group, context, diff_group_membership)
        .flatten(|e| &e.data, diff_element_data)
        .finish()
}

/// Element of a snippet; snippets have no content groups
pub fn diff_snippet_element(source: &Element, target: &Element) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("codename", |e| &e.codename, Constant)
        .field("external_id", |e| &e.external_id, Constant)
        .field("content_group", |e| &e.content_group, Constant)
        .flatten(|e| &e.data, diff_element_data)
        .finish()
}

/// Membership only matters when the source type is grouped. Ungrouping a
/// type is expressed by removing its groups.
fn diff_group_membership(
    source: &Option<CodenameRef>,
    target: &Option<CodenameRef>,
    context: Context<'_, ContentType>,
) -> Vec<PatchOperation> {
    if context.source.content_groups.is_empty() {
        return Vec::new();
    }
    Optional(Leaf).diff(source, target)
}

pub fn diff_element_data(source: &ElementData, target: &ElementData) -> Vec<PatchOperation> {
    Union::new(ElementData::kind, diff_same_kind).diff(source, target)
}

fn diff_same_kind(source: &ElementData, target: &ElementData) -> Vec<PatchOperation> {
    match (source, target) {
        (ElementData::Text(s), ElementData::Text(t)) => diff_text(s, t),
        (ElementData::Number(s), ElementData::Number(t)) => diff_number(s, t),
        (ElementData::Asset(s), ElementData::Asset(t)) => diff_asset(s, t),
        (ElementData::RichText(s), ElementData::RichText(t)) => diff_rich_text(s, t),
        (ElementData::Taxonomy(s), ElementData::Taxonomy(t)) => diff_taxonomy(s, t),
        (ElementData::MultipleChoice(s), ElementData::MultipleChoice(t)) => diff_multiple_choice(s, t),
        (ElementData::DateTime(s), ElementData::DateTime(t)) => diff_date_time(s, t),
        (ElementData::UrlSlug(s), ElementData::UrlSlug(t)) => diff_url_slug(s, t),
        (ElementData::Guidelines(s), ElementData::Guidelines(t)) => diff_guidelines(s, t),
        (ElementData::Custom(s), ElementData::Custom(t)) => diff_custom(s, t),
        (ElementData::LinkedItems(s), ElementData::LinkedItems(t))
        | (ElementData::Subpages(s), ElementData::Subpages(t)) => diff_linked_items(s, t),
        (ElementData::Snippet(s), ElementData::Snippet(t)) => diff_snippet_reference(s, t),
        (s, t) => unreachable!(
            "element kinds {} and {} reached the same-kind comparison",
            s.kind(),
            t.kind()
        ),
    }
}

fn named<'a, T: NamedElement>(diff: ObjectDiff<'a, T>) -> ObjectDiff<'a, T> {
    diff.field("name", |e| e.name(), Leaf)
        .field("guidelines", |e| e.guidelines(), Leaf)
        .field("is_required", |e| e.is_required(), Leaf)
        .field("is_non_localizable", |e| e.is_non_localizable(), Leaf)
}

fn diff_text(source: &TextElement, target: &TextElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("maximum_length", |e| &e.maximum_length, Optional(Leaf))
        .field("validation_regex", |e| &e.validation_regex, Optional(Leaf))
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_number(source: &NumberElement, target: &NumberElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_asset(source: &AssetElement, target: &AssetElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("asset_count_limit", |e| &e.asset_count_limit, Optional(Leaf))
        .field("maximum_file_size", |e| &e.maximum_file_size, Leaf)
        .field("allowed_file_types", |e| &e.allowed_file_types, Leaf)
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_rich_text(source: &RichTextElement, target: &RichTextElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("maximum_text_length", |e| &e.maximum_text_length, Optional(Leaf))
        .field("maximum_image_size", |e| &e.maximum_image_size, Leaf)
        .field("allowed_content_types", |e| &e.allowed_content_types, KeyedArray::new(Constant))
        .field("allowed_item_link_types", |e| &e.allowed_item_link_types, KeyedArray::new(Constant))
        .field("allowed_blocks", |e| &e.allowed_blocks, Leaf)
        .field("allowed_formatting", |e| &e.allowed_formatting, Leaf)
        .finish()
}

fn diff_taxonomy(source: &TaxonomyElement, target: &TaxonomyElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("taxonomy_group", |e| &e.taxonomy_group, Leaf)
        .field("term_count_limit", |e| &e.term_count_limit, Optional(Leaf))
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_multiple_choice(source: &MultipleChoiceElement, target: &MultipleChoiceElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("mode", |e| &e.mode, Leaf)
        .field("options", |e| &e.options, Positional::new(diff_option))
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_option(source: &MultipleChoiceOption, target: &MultipleChoiceOption) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |o| &o.name, Leaf)
        .field("external_id", |o| &o.external_id, Constant)
        // Last: the path of every other field uses the old codename
        .field("codename", |o| &o.codename, Leaf)
        .finish()
}

fn diff_date_time(source: &DateTimeElement, target: &DateTimeElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_url_slug(source: &UrlSlugElement, target: &UrlSlugElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("depends_on", |e| &e.depends_on, Leaf)
        .field("validation_regex", |e| &e.validation_regex, Optional(Leaf))
        .finish()
}

fn diff_guidelines(source: &GuidelinesElement, target: &GuidelinesElement) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("guidelines", |e| &e.guidelines, Leaf)
        .finish()
}

fn diff_custom(source: &CustomElement, target: &CustomElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("source_url", |e| &e.source_url, Leaf)
        .field("json_parameters", |e| &e.json_parameters, Leaf)
        .field("allowed_elements", |e| &e.allowed_elements, KeyedArray::new(Constant))
        .finish()
}

fn diff_linked_items(source: &LinkedItemsElement, target: &LinkedItemsElement) -> Vec<PatchOperation> {
    named(ObjectDiff::new(source, target))
        .field("allowed_content_types", |e| &e.allowed_content_types, KeyedArray::new(Constant))
        .field("item_count_limit", |e| &e.item_count_limit, Optional(Leaf))
        .field("default", |e| &e.default, Leaf)
        .finish()
}

fn diff_snippet_reference(source: &SnippetElement, target: &SnippetElement) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("snippet", |e| &e.snippet, Leaf)
        .finish()
}
