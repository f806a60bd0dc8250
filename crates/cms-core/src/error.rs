//! Error types for cms-core

use std::fmt;
use std::path::PathBuf;

use cms_model::EntityKind;

use crate::client::ClientError;

/// Result type for cms-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// A required structural reference with nothing to point at on the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    /// Kind of the referenced entity
    pub kind: EntityKind,
    pub codename: String,
    /// Where the reference appears, e.g. `contentTypes/article/elements/tags`
    pub location: String,
}

impl fmt::Display for MissingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` referenced from {}", self.kind, self.codename, self.location)
    }
}

fn list(missing: &[MissingReference]) -> String {
    missing.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Errors that can occur while resolving and applying a sync
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required references missing on the target; nothing was applied
    #[error("Required references cannot be resolved: {}", list(.missing))]
    UnresolvedReference { missing: Vec<MissingReference> },

    /// A remote call failed while applying a unit of work
    #[error("Failed to {unit}: {source}")]
    Apply { unit: String, source: ClientError },

    /// A remote call failed outside of the apply phases
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Sync configuration file is not valid TOML
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Model error from cms-model
    #[error(transparent)]
    Model(#[from] cms_model::Error),

    /// Patch application error from cms-diff
    #[error(transparent)]
    Diff(#[from] cms_diff::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
