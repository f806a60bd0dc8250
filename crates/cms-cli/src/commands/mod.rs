//! Command implementations for cms-cli

pub mod diff;
pub mod sync;
pub mod validate;

pub use diff::run_diff;
pub use sync::{SyncFlags, run_sync};
pub use validate::{run_normalize, run_validate};

use cms_model::{EntityFilter, EntityKind};

/// Allow-list from `--entities`; every kind when none is given
pub fn entity_filter(kinds: &[EntityKind]) -> Option<EntityFilter> {
    if kinds.is_empty() {
        None
    } else {
        Some(EntityFilter::only(kinds.iter().copied()))
    }
}
