use cms_model::{ContentGroup, ContentType, ContentTypeSnippet};

use super::element::{diff_snippet_element, diff_type_element};
use crate::handler::{Constant, Context, Leaf, ObjectDiff, WithContext};
use crate::handlers::Ordered;
use crate::operation::PatchOperation;

pub fn diff_content_type(source: &ContentType, target: &ContentType) -> Vec<PatchOperation> {
    let context = Context::new(source, target);
    ObjectDiff::new(source, target)
        .field("name", |t| &t.name, Leaf)
        .field("codename", |t| &t.codename, Constant)
        .field("external_id", |t| &t.external_id, Constant)
        .field("content_groups", |t| &t.content_groups, Ordered::new(diff_content_group))
        .field(
            "elements",
            |t| &t.elements,
            Ordered::new(WithContext::new(diff_type_element, context)),
        )
        .finish()
}

fn diff_content_group(source: &ContentGroup, target: &ContentGroup) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |g| &g.name, Leaf)
        .field("codename", |g| &g.codename, Constant)
        .field("external_id", |g| &g.external_id, Constant)
        .finish()
}

pub fn diff_snippet(source: &ContentTypeSnippet, target: &ContentTypeSnippet) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |s| &s.name, Leaf)
        .field("codename", |s| &s.codename, Constant)
        .field("external_id", |s| &s.external_id, Constant)
        .field("elements", |s| &s.elements, Ordered::new(diff_snippet_element))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Anchor;
    use cms_model::element::{NumberElement, TextElement};
    use cms_model::{CodenameRef, Element, ElementData};
    use pretty_assertions::assert_eq;

    fn text(codename: &str, name: &str) -> Element {
        Element::new(
            codename,
            ElementData::Text(TextElement {
                name: name.into(),
                guidelines: None,
                is_required: false,
                is_non_localizable: false,
                maximum_length: None,
                validation_regex: None,
                default: None,
            }),
        )
    }

    fn number(codename: &str) -> Element {
        Element::new(
            codename,
            ElementData::Number(NumberElement {
                name: codename.into(),
                guidelines: None,
                is_required: false,
                is_non_localizable: false,
                default: None,
            }),
        )
    }

    fn article(groups: &[&str], elements: Vec<Element>) -> ContentType {
        ContentType {
            name: "Article".into(),
            codename: "article".into(),
            external_id: Some("contentTypes.article".into()),
            content_groups: groups
                .iter()
                .map(|g| ContentGroup {
                    name: g.to_string(),
                    codename: g.to_string(),
                    external_id: None,
                })
                .collect(),
            elements,
        }
    }

    #[test]
    fn element_changes_are_scoped_by_codename() {
        let source = article(&[], vec![text("title", "Headline"), number("rating")]);
        let target = article(&[], vec![text("title", "Title")]);

        let ops = diff_content_type(&source, &target);

        assert_eq!(
            ops,
            vec![
                PatchOperation::replace("/elements/codename:title/name", "Headline", "Title"),
                PatchOperation::add_into("/elements", &source.elements[1])
                    .with_anchor(Some(Anchor::After("title".into()))),
            ]
        );
    }

    #[test]
    fn group_membership_ignored_for_ungrouped_source() {
        let mut target_element = text("title", "Title");
        target_element.content_group = Some(CodenameRef::new("content"));
        let source = article(&[], vec![text("title", "Title")]);
        let target = article(&["content"], vec![target_element]);

        let ops = diff_content_type(&source, &target);

        assert_eq!(
            ops,
            vec![PatchOperation::remove(
                "/content_groups/codename:content",
                &target.content_groups[0]
            )]
        );
    }

    #[test]
    fn group_membership_compared_for_grouped_source() {
        let source = article(
            &["content", "seo"],
            vec![text("title", "Title").in_group("seo")],
        );
        let target = article(
            &["content", "seo"],
            vec![text("title", "Title").in_group("content")],
        );

        let ops = diff_content_type(&source, &target);

        assert_eq!(
            ops,
            vec![PatchOperation::replace(
                "/elements/codename:title/content_group",
                &CodenameRef::new("seo"),
                &CodenameRef::new("content"),
            )]
        );
    }
}
