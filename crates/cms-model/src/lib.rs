//! Sync Model types, normalization and snapshot validation
//!
//! The Sync Model is the id-free, codename-keyed form of an environment's
//! content model that the diff engine compares:
//!
//! - **Entities**: content types, snippets, taxonomies, asset folders,
//!   collections, spaces, languages and the Web Spotlight setting
//! - **Normalization**: raw, id-bearing snapshots into Sync Models
//! - **Snapshot folders**: per-kind JSON files, schema-validated on load

pub mod element;
pub mod entity;
pub mod error;
pub mod folder;
pub mod guidelines;
pub mod kind;
pub mod model;
pub mod normalize;
pub mod reference;
pub mod validation;

pub use element::{Element, ElementData, ElementKind, NamedElement};
pub use entity::{
    AssetFolder, Collection, ContentGroup, ContentType, ContentTypeSnippet, Keyed, Language, Space,
    TaxonomyGroup, TaxonomyTerm, WebSpotlight,
};
pub use error::{Error, Result, ValidationIssue};
pub use folder::{load_folder, write_folder};
pub use kind::{EntityFilter, EntityKind, ReferenceKind};
pub use model::SyncModel;
pub use normalize::{ContentKey, EnvironmentSnapshot, normalize};
pub use reference::{CodenameRef, Reference, derive_external_id, placeholder_external_id};
pub use validation::{validate_document, validate_model};
