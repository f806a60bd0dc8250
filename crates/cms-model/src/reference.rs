//! References between entities
//!
//! Structural references (language fallback, taxonomy group, allowed content
//! types, ...) always carry a codename. References to content items and
//! assets, which are migrated separately, may instead carry an external id
//! when the referenced entity is not known to exist.

use serde::{Deserialize, Serialize};

use crate::kind::ReferenceKind;

/// A reference to another entity by codename
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CodenameRef {
    pub codename: String,
}

impl CodenameRef {
    pub fn new(codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
        }
    }
}

/// A reference to a content item or asset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Codename { codename: String },
    ExternalId { external_id: String },
}

impl Reference {
    pub fn codename(codename: impl Into<String>) -> Self {
        Self::Codename {
            codename: codename.into(),
        }
    }

    pub fn external_id(external_id: impl Into<String>) -> Self {
        Self::ExternalId {
            external_id: external_id.into(),
        }
    }

    pub fn as_codename(&self) -> Option<&str> {
        match self {
            Self::Codename { codename } => Some(codename),
            Self::ExternalId { .. } => None,
        }
    }
}

/// External id used for a reference whose target could not be found.
///
/// Creating an entity with an external-id reference succeeds even when
/// nothing carries that external id yet, so the reference dangles instead of
/// failing the write.
pub fn placeholder_external_id(kind: ReferenceKind, old_id: &str) -> String {
    format!("non-existent-{}-{}", kind.as_str(), old_id)
}

/// External id derived for an entity that was created without one.
///
/// Codenames only contain `[a-z0-9_]`, so the `.` separator keeps distinct
/// parent/codename pairs distinct.
pub fn derive_external_id(parent: &str, codename: &str) -> String {
    format!("{}.{}", parent, codename)
}
