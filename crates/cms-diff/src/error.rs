//! Error types for cms-diff

use cms_model::EntityKind;

/// Result type for cms-diff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while applying patch operations.
///
/// Computing a diff cannot fail; only applying one to a document can.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Anchor `{codename}` not found in array at {path}")]
    AnchorNotFound { path: String, codename: String },

    #[error("Expected an array at {path}")]
    NotAnArray { path: String },

    #[error("Invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("{kind} entity `{codename}` not found")]
    EntityNotFound { kind: EntityKind, codename: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }
}
