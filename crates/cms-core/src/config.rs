//! Sync configuration parsed from TOML files
//!
//! ```toml
//! entities = ["contentTypes", "contentTypeSnippets", "taxonomies"]
//! continue_on_error = true
//! dry_run = false
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::fs;
use std::path::Path;

use cms_model::{EntityFilter, EntityKind};
use serde::{Deserialize, Serialize};

use crate::engine::SyncOptions;
use crate::error::{Error, Result};

/// Sync configuration from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Entity kinds to sync; all kinds when absent
    pub entities: Option<Vec<EntityKind>>,
    pub continue_on_error: bool,
    pub dry_run: bool,
}

impl SyncConfig {
    /// Parse a configuration from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use cms_core::SyncConfig;
    /// use cms_model::EntityKind;
    ///
    /// let config = SyncConfig::parse(r#"entities = ["taxonomies"]"#).unwrap();
    /// assert_eq!(config.entities, Some(vec![EntityKind::Taxonomies]));
    /// assert!(!config.dry_run);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded sync configuration");
        Self::parse(&content)
    }

    pub fn into_options(self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            continue_on_error: self.continue_on_error,
            entities: match self.entities {
                Some(kinds) => EntityFilter::only(kinds),
                None => EntityFilter::all(),
            },
        }
    }
}
