//! End-to-end diff scenarios over whole models

use cms_diff::{DiffModel, OperationKind, PatchOperation, WebSpotlightChange, apply_diff};
use cms_model::{CodenameRef, EntityFilter, SyncModel, WebSpotlight};
use cms_test_utils::fixtures::{
    collection, content_type, custom_element, multiple_choice_element, rich_text_element, sample_model, taxonomy,
    term, text_element,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn diff(source: &SyncModel, target: &SyncModel) -> DiffModel {
    DiffModel::compute(source, target, &EntityFilter::all())
}

#[test]
fn added_term_is_scoped_to_its_group() {
    let source = SyncModel {
        taxonomies: vec![taxonomy("colors", vec![term("red", vec![]), term("green", vec![])])],
        ..SyncModel::default()
    };
    let target = SyncModel {
        taxonomies: vec![taxonomy("colors", vec![term("red", vec![])])],
        ..SyncModel::default()
    };

    let result = diff(&source, &target);

    let ops = &result.taxonomies.updated["colors"];
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind(), OperationKind::AddInto);
    assert_eq!(ops[0].path(), "/terms");
    assert_eq!(ops[0].added_codename(), Some("green"));
    assert!(result.taxonomies.added.is_empty());
    assert!(result.taxonomies.deleted.is_empty());
}

#[test]
fn element_kind_change_is_remove_then_add() {
    let source = SyncModel {
        content_types: vec![content_type(
            "article",
            vec![custom_element("body", "https://example.com/editor")],
        )],
        ..SyncModel::default()
    };
    let target = SyncModel {
        content_types: vec![content_type("article", vec![rich_text_element("body", &[])])],
        ..SyncModel::default()
    };

    let ops = &diff(&source, &target).content_types.updated["article"];

    assert_eq!(
        ops,
        &vec![
            PatchOperation::remove("/elements/codename:body", &target.content_types[0].elements[0]),
            PatchOperation::add_into("/elements", &source.content_types[0].elements[0]),
        ]
    );
    assert!(ops.iter().all(|op| op.kind() != OperationKind::Replace));
}

#[test]
fn swapped_collections_need_one_move() {
    let source = SyncModel {
        collections: vec![collection("b"), collection("a")],
        ..SyncModel::default()
    };
    let target = SyncModel {
        collections: vec![collection("a"), collection("b")],
        ..SyncModel::default()
    };

    let result = diff(&source, &target);

    assert!(result.collections.updated.is_empty());
    assert_eq!(result.collections.order.len(), 1);
    assert_eq!(result.collections.order[0].kind(), OperationKind::Move);

    let patched = apply_diff(&target, &result).unwrap();
    assert_eq!(patched.collections, source.collections);
}

#[test]
fn enabling_web_spotlight_activates_with_root_type() {
    let source = SyncModel {
        web_spotlight: WebSpotlight {
            enabled: true,
            root_type: Some(CodenameRef::new("article")),
        },
        ..SyncModel::default()
    };

    let result = diff(&source, &SyncModel::default());

    assert_eq!(
        result.web_spotlight,
        WebSpotlightChange::Activate {
            root_type_codename: "article".into()
        }
    );
    assert_eq!(
        serde_json::to_value(&result.web_spotlight).unwrap(),
        json!({"change": "activate", "rootTypeCodename": "article"})
    );
}

#[test]
fn renaming_an_element_does_not_move_it() {
    let source = SyncModel {
        content_types: vec![content_type("article", vec![text_element("title"), text_element("lead")])],
        ..SyncModel::default()
    };
    let mut target = source.clone();
    if let cms_model::ElementData::Text(text) = &mut target.content_types[0].elements[1].data {
        text.name = "Intro".into();
    }

    let ops = &diff(&source, &target).content_types.updated["article"];

    assert_eq!(
        ops,
        &vec![PatchOperation::replace("/elements/codename:lead/name", "Lead", "Intro")]
    );
}

#[test]
fn reordering_elements_only_moves() {
    let source = SyncModel {
        content_types: vec![content_type(
            "article",
            vec![text_element("title"), text_element("lead"), text_element("footer")],
        )],
        ..SyncModel::default()
    };
    let mut target = source.clone();
    target.content_types[0].elements.reverse();

    let ops = &diff(&source, &target).content_types.updated["article"];

    assert!(!ops.is_empty());
    assert!(ops.iter().all(|op| op.kind() == OperationKind::Move));
    assert!(ops.len() <= 2);
}

#[test]
fn applied_sample_changes_converge() {
    let source = sample_model();
    let mut target = sample_model();
    target.content_types.remove(0);
    target.collections.reverse();
    target.languages[1].fallback_language = None;
    target.taxonomies[0].terms[0].terms.pop();
    target.asset_folders[0].folders.clear();
    target.web_spotlight.enabled = false;
    target.content_type_snippets[0].elements.swap(0, 1);

    let result = diff(&source, &target);
    assert_eq!(result.content_types.added.len(), 1);

    let patched = apply_diff(&target, &result).unwrap();
    assert!(diff(&source, &patched).is_empty());
}

#[test]
fn reordered_options_converge() {
    let model = |options: &[&str]| SyncModel {
        content_types: vec![content_type("article", vec![multiple_choice_element("layout", options)])],
        ..SyncModel::default()
    };
    let source = model(&["wide", "narrow"]);
    let target = model(&["narrow", "wide"]);

    let result = diff(&source, &target);
    let ops = &result.content_types.updated["article"];
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind(), OperationKind::Replace);
    assert_eq!(ops[0].path(), "/elements/codename:layout/options");

    let patched = apply_diff(&target, &result).unwrap();
    assert!(diff(&source, &patched).is_empty());
    assert_eq!(patched, source);
}
