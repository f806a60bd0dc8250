//! Tests for loading and writing snapshot folders

use std::fs;

use cms_model::{
    Collection, EntityKind, Error, Language, SyncModel, WebSpotlight, load_folder, write_folder,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn sample_model() -> SyncModel {
    SyncModel {
        collections: vec![Collection {
            name: "Default".into(),
            codename: "default".into(),
            external_id: Some("collections.default".into()),
        }],
        languages: vec![Language {
            name: "English".into(),
            codename: "en".into(),
            external_id: None,
            is_active: true,
            is_default: true,
            fallback_language: None,
        }],
        web_spotlight: WebSpotlight {
            enabled: false,
            root_type: None,
        },
        ..SyncModel::default()
    }
}

#[test]
fn written_folder_loads_back() {
    let dir = TempDir::new().unwrap();
    let model = sample_model();

    write_folder(dir.path(), &model).unwrap();
    let loaded = load_folder(dir.path()).unwrap();

    assert_eq!(loaded, model);
    for kind in EntityKind::ALL {
        assert!(dir.path().join(kind.file_name()).exists(), "{} missing", kind);
    }
}

#[test]
fn missing_files_mean_empty_kinds() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("collections.json"),
        json!([{"name": "Default", "codename": "default"}]).to_string(),
    )
    .unwrap();

    let model = load_folder(dir.path()).unwrap();

    assert_eq!(model.collections.len(), 1);
    assert!(model.content_types.is_empty());
    assert!(!model.web_spotlight.enabled);
}

#[test]
fn issues_from_every_file_are_reported_together() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("collections.json"), r#"[{"codename": "default"}]"#).unwrap();
    fs::write(dir.path().join("languages.json"), "{ not json").unwrap();
    fs::write(dir.path().join("webSpotlight.json"), r#"{"enabled": "yes"}"#).unwrap();

    let err = load_folder(dir.path()).unwrap_err();

    let Error::Validation { issues } = err else {
        panic!("expected a validation error, got {:?}", err);
    };
    let files: Vec<&str> = issues.iter().map(|i| i.file.as_str()).collect();
    assert_eq!(files, vec!["collections.json", "languages.json", "webSpotlight.json"]);
}

#[test]
fn missing_folder_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_folder(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
