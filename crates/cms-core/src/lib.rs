//! Reference resolution and staged sync execution
//!
//! This crate applies a [`DiffModel`](cms_diff::DiffModel) to a target
//! environment:
//!
//! - **Client**: the [`ManagementClient`] seam to a target environment, and
//!   the in-memory [`MemoryEnvironment`]
//! - **Resolver**: required-reference verification and item/asset lookup
//! - **Executor**: the fixed [`SyncPlan`] run one unit of work at a time
//! - **Engine**: the [`SyncEngine`] facade and its [`SyncReport`]
//! - **Config**: [`SyncConfig`] loaded from TOML

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod memory;
pub mod plan;
pub mod resolver;

pub use client::{ClientError, ClientResult, ManagementClient, RemoteEntity};
pub use config::SyncConfig;
pub use engine::{SyncEngine, SyncOptions, SyncReport};
pub use error::{Error, MissingReference, Result};
pub use executor::{Skeleton, Skeletons, SyncExecutor};
pub use memory::MemoryEnvironment;
pub use plan::{SyncPlan, SyncStep};
pub use resolver::{ReferenceResolver, collect_references, verify_required};
