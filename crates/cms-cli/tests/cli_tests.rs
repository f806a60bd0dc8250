//! Integration tests that run the `cms-sync` binary against snapshot folders

use std::fs;

use assert_cmd::Command;
use cms_model::{EntityKind, SyncModel, load_folder};
use cms_test_utils::folder::TestFolder;
use cms_test_utils::fixtures::{collection, content_type, sample_model, taxonomy, text_element};
use predicates::prelude::*;
use serde_json::{Value, json};

/// Get a Command for the cms-sync binary
fn cms_sync() -> Command {
    Command::cargo_bin("cms-sync").expect("Failed to find cms-sync binary")
}

fn stale_target() -> SyncModel {
    let mut target = sample_model();
    target.content_types.push(content_type("legacy", vec![text_element("title")]));
    target.taxonomies.push(taxonomy("old", vec![]));
    target.collections[1].name = "Promotions".into();
    target
}

// ============================================================================
// help and argument errors
// ============================================================================

#[test]
fn test_help_lists_commands() {
    cms_sync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_unknown_entity_kind_fails() {
    let source = TestFolder::with_model(&sample_model());
    cms_sync()
        .arg("diff")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(source.root())
        .args(["--entities", "workflows"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity kind"));
}

// ============================================================================
// diff
// ============================================================================

#[test]
fn test_diff_of_identical_folders() {
    let folder = TestFolder::with_model(&sample_model());
    cms_sync()
        .arg("diff")
        .arg("-s")
        .arg(folder.root())
        .arg("-t")
        .arg(folder.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences"));
}

#[test]
fn test_diff_lists_changes() {
    let source = TestFolder::with_model(&sample_model());
    let target = TestFolder::with_model(&stale_target());

    cms_sync()
        .arg("diff")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(target.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy"))
        .stdout(predicate::str::contains("replace /name"));
}

#[test]
fn test_diff_json_respects_entities() {
    let source = TestFolder::with_model(&sample_model());
    let target = TestFolder::with_model(&stale_target());

    let output = cms_sync()
        .arg("diff")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(target.root())
        .args(["--entities", "taxonomies", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let diff: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(diff["taxonomies"]["deleted"], json!(["old"]));
    assert_eq!(diff["contentTypes"]["deleted"], json!([]));
    assert_eq!(diff["collections"]["updated"], json!({}));
}

// ============================================================================
// sync
// ============================================================================

#[test]
fn test_sync_writes_target() {
    let source = TestFolder::with_model(&sample_model());
    let target = TestFolder::with_model(&stale_target());

    cms_sync()
        .arg("sync")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(target.root())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("delete content type `legacy`"))
        .stdout(predicate::str::contains("Sync complete"));

    assert_eq!(load_folder(target.root()).unwrap(), sample_model());
}

#[test]
fn test_sync_dry_run_leaves_target_alone() {
    let source = TestFolder::with_model(&sample_model());
    let target = TestFolder::with_model(&stale_target());
    let before = fs::read_to_string(target.path_of(EntityKind::ContentTypes)).unwrap();

    cms_sync()
        .arg("sync")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(target.root())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] Would delete taxonomy group `old`"));

    let after = fs::read_to_string(target.path_of(EntityKind::ContentTypes)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_sync_reads_config_file() {
    let source = TestFolder::with_model(&sample_model());
    let target = TestFolder::with_model(&stale_target());
    let config = tempfile::NamedTempFile::new().unwrap();
    fs::write(config.path(), "entities = [\"collections\"]\n").unwrap();

    cms_sync()
        .arg("sync")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(target.root())
        .arg("--config")
        .arg(config.path())
        .arg("--yes")
        .assert()
        .success();

    let synced = load_folder(target.root()).unwrap();
    assert_eq!(synced.collections, sample_model().collections);
    assert!(synced.content_type("legacy").is_some());
}

#[test]
fn test_sync_with_unresolvable_reference_fails() {
    let source = TestFolder::with_model(&sample_model());
    let target = TestFolder::with_model(&SyncModel {
        collections: vec![collection("default")],
        ..SyncModel::default()
    });

    cms_sync()
        .arg("sync")
        .arg("-s")
        .arg(source.root())
        .arg("-t")
        .arg(target.root())
        .args(["--entities", "spaces", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("marketing"));
}

// ============================================================================
// validate and normalize
// ============================================================================

#[test]
fn test_validate_reports_all_issues() {
    let folder = TestFolder::with_model(&sample_model());
    folder.write_raw(EntityKind::Collections, "not json");
    folder.write_kind(EntityKind::Languages, &json!([{"name": "English"}]));

    cms_sync()
        .arg("validate")
        .arg(folder.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("collections.json"))
        .stderr(predicate::str::contains("languages.json"));
}

#[test]
fn test_validate_accepts_sample() {
    let folder = TestFolder::with_model(&sample_model());
    cms_sync()
        .arg("validate")
        .arg(folder.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid snapshot"));
}

#[test]
fn test_normalize_writes_snapshot_folder() {
    let export = tempfile::NamedTempFile::new().unwrap();
    let raw = json!({
        "collections": [{"id": "c-1", "name": "Default", "codename": "default"}],
        "languages": [{"id": "l-1", "name": "English", "codename": "en", "is_default": true}],
        "spaces": [{"id": "s-1", "name": "Site", "codename": "site", "collections": [{"id": "c-1"}]}]
    });
    fs::write(export.path(), raw.to_string()).unwrap();
    let out = TestFolder::new();

    cms_sync()
        .arg("normalize")
        .arg("--snapshot")
        .arg(export.path())
        .arg("--out")
        .arg(out.root())
        .assert()
        .success();

    let model = load_folder(out.root()).unwrap();
    assert_eq!(model.spaces[0].collections[0].codename, "default");
}
