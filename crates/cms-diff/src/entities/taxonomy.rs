use cms_model::{TaxonomyGroup, TaxonomyTerm};

use crate::handler::{Constant, Leaf, ObjectDiff};
use crate::handlers::Ordered;
use crate::operation::PatchOperation;

pub fn diff_taxonomy_group(source: &TaxonomyGroup, target: &TaxonomyGroup) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |g| &g.name, Leaf)
        .field("codename", |g| &g.codename, Constant)
        .field("external_id", |g| &g.external_id, Constant)
        .field("terms", |g| &g.terms, Ordered::new(diff_term))
        .finish()
}

/// Terms are matched per level; a term that changes parent is removed from
/// the old parent and added under the new one.
fn diff_term(source: &TaxonomyTerm, target: &TaxonomyTerm) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |t| &t.name, Leaf)
        .field("codename", |t| &t.codename, Constant)
        .field("external_id", |t| &t.external_id, Constant)
        .field("terms", |t| &t.terms, Ordered::new(diff_term))
        .finish()
}
