//! [`TestFolder`]: a temporary snapshot folder

use std::fs;
use std::path::{Path, PathBuf};

use cms_model::{EntityKind, SyncModel, write_folder};
use serde_json::Value;
use tempfile::TempDir;

/// A temporary directory holding per-kind snapshot files
pub struct TestFolder {
    temp_dir: TempDir,
}

impl Default for TestFolder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFolder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A folder holding every kind of `model`
    pub fn with_model(model: &SyncModel) -> Self {
        let folder = Self::new();
        write_folder(folder.root(), model).unwrap();
        folder
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path_of(&self, kind: EntityKind) -> PathBuf {
        self.root().join(kind.file_name())
    }

    /// Overwrite one kind's file with raw JSON, valid or not
    pub fn write_kind(&self, kind: EntityKind, value: &Value) {
        fs::write(self.path_of(kind), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    /// Overwrite one kind's file with raw text
    pub fn write_raw(&self, kind: EntityKind, text: &str) {
        fs::write(self.path_of(kind), text).unwrap();
    }

    pub fn read_kind(&self, kind: EntityKind) -> Value {
        let text = fs::read_to_string(self.path_of(kind)).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}
