//! Error types for cms-model

use std::fmt;
use std::path::PathBuf;

/// Result type for cms-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, validating or normalizing models
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more snapshot files failed validation. All issues across all
    /// files are collected before this is returned.
    #[error("Snapshot validation failed with {} issue(s):\n{}", .issues.len(), IssueList(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    /// A structural reference in a raw snapshot points at an id that no
    /// entity in the snapshot carries.
    #[error("Dangling reference to id {id} at {location}")]
    DanglingReference { id: String, location: String },

    /// A raw snapshot entity is missing its codename.
    #[error("Entity at {location} has no codename")]
    MissingCodename { location: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single schema or semantic problem found in a snapshot file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// File the issue was found in (e.g. `contentTypes.json`)
    pub file: String,
    /// JSON pointer to the offending value
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(file: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}: {}", self.file, self.path, self.message)
    }
}

struct IssueList<'a>(&'a [ValidationIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}
