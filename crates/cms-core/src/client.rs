//! The management-client seam
//!
//! Everything the resolver and executor need from a target environment.
//! Transport, retries and authentication live behind implementations of
//! [`ManagementClient`]; [`MemoryEnvironment`](crate::MemoryEnvironment)
//! is the in-process one.

use async_trait::async_trait;
use cms_diff::PatchOperation;
use cms_model::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result type for management-client calls
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("{kind} `{codename}` not found")]
    NotFound { kind: String, codename: String },

    #[error("Request failed: {message}")]
    Request { message: String },
}

impl ClientError {
    pub fn not_found(kind: impl ToString, codename: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            codename: codename.into(),
        }
    }

    pub fn request(message: impl ToString) -> Self {
        Self::Request {
            message: message.to_string(),
        }
    }
}

/// Identity of an entity as stored on the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntity {
    pub id: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// Write and lookup access to a target environment.
///
/// Calls are issued one at a time, in plan order; implementations need not
/// handle concurrent mutation.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Create an entity from an add payload
    async fn add_entity(&self, kind: EntityKind, payload: Value) -> ClientResult<RemoteEntity>;

    /// Patch one entity in place
    async fn patch_entity(&self, kind: EntityKind, codename: &str, ops: &[PatchOperation]) -> ClientResult<()>;

    /// Patch a kind's whole list (asset folder tree, collection or language order)
    async fn patch_list(&self, kind: EntityKind, ops: &[PatchOperation]) -> ClientResult<()>;

    async fn delete_entity(&self, kind: EntityKind, codename: &str) -> ClientResult<()>;

    /// Internal id of an existing entity
    async fn entity_id(&self, kind: EntityKind, codename: &str) -> ClientResult<String>;

    async fn find_content_item(&self, codename: &str) -> ClientResult<RemoteEntity>;

    async fn find_asset(&self, codename: &str) -> ClientResult<RemoteEntity>;

    async fn activate_web_spotlight(&self, root_type_id: &str) -> ClientResult<()>;

    async fn deactivate_web_spotlight(&self) -> ClientResult<()>;
}
