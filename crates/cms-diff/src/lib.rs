//! Structural diff and patch engine for content-model sync
//!
//! Compares two Sync Models and produces the patch operations that turn the
//! target into the source:
//!
//! - **Handlers**: pure comparison functions and the combinators that
//!   compose them (leaf, optional, object, keyed array, ordering, union)
//! - **Entity diffs**: one handler per entity kind, gathered into a
//!   [`DiffModel`]
//! - **Application**: operations applied to JSON documents and whole Diff
//!   Models applied to in-memory models

pub mod adjust;
pub mod apply;
pub mod entities;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod model;
pub mod operation;
pub mod path;

pub use adjust::adjust;
pub use apply::{apply_diff, apply_operations};
pub use entities::{
    WebSpotlightChange, diff_asset_folders, diff_collection, diff_content_type, diff_element_data,
    diff_language, diff_snippet, diff_space, diff_taxonomy_group, diff_web_spotlight,
};
pub use error::{Error, Result};
pub use handler::{Constant, Context, ContextHandler, Handler, Leaf, ObjectDiff, Optional, WithContext};
pub use handlers::{KeyedArray, Ordered, Positional, Union, Whole, reorder_moves};
pub use model::{DiffCounts, DiffModel, EntityDiff};
pub use operation::{Anchor, OperationKind, PatchOperation};
