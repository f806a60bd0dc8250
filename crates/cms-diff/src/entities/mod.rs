//! Per-entity diff functions

mod asset_folder;
mod content_type;
mod element;
mod flat;
mod taxonomy;
mod web_spotlight;

pub use asset_folder::diff_asset_folders;
pub use content_type::{diff_content_type, diff_snippet};
pub use element::{diff_element_data, diff_snippet_element, diff_type_element};
pub use flat::{diff_collection, diff_language, diff_space};
pub use taxonomy::diff_taxonomy_group;
pub use web_spotlight::{WebSpotlightChange, diff_web_spotlight};
