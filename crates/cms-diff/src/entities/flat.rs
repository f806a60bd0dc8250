use cms_model::{Collection, Language, Space};

use crate::handler::{Constant, Leaf, ObjectDiff, Optional};
use crate::handlers::Whole;
use crate::operation::PatchOperation;

pub fn diff_collection(source: &Collection, target: &Collection) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |c| &c.name, Leaf)
        .field("codename", |c| &c.codename, Constant)
        .field("external_id", |c| &c.external_id, Constant)
        .finish()
}

/// The default language is fixed per environment and never synchronized
pub fn diff_language(source: &Language, target: &Language) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |l| &l.name, Leaf)
        .field("codename", |l| &l.codename, Constant)
        .field("external_id", |l| &l.external_id, Constant)
        .field("is_active", |l| &l.is_active, Leaf)
        .field("is_default", |l| &l.is_default, Constant)
        .field("fallback_language", |l| &l.fallback_language, Optional(Leaf))
        .finish()
}

pub fn diff_space(source: &Space, target: &Space) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |s| &s.name, Leaf)
        .field("codename", |s| &s.codename, Constant)
        .field("external_id", |s| &s.external_id, Constant)
        .field("web_spotlight_root_item", |s| &s.web_spotlight_root_item, Optional(Leaf))
        .field("collections", |s| &s.collections, Whole)
        .finish()
}
