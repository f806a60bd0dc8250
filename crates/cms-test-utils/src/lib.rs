//! Shared test fixtures for the content-model sync workspace.
//!
//! A dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`fixtures`]: builders for entities, elements and a sample model
//! - [`folder`]: [`TestFolder`](folder::TestFolder), a temporary snapshot folder

pub mod fixtures;
pub mod folder;
