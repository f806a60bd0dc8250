//! Position-correlated array comparison

use cms_model::Keyed;
use serde::Serialize;

use crate::handler::Handler;
use crate::operation::PatchOperation;
use crate::path::codename_segment;

/// Pairs source and target members by index instead of by key.
///
/// Used for multiple-choice options. A paired member is addressed by its
/// target codename, so a codename change arrives as a `replace` of
/// `/codename:<old>/codename`; element handlers declare `codename` last so
/// that sibling fields are patched while the old codename still resolves.
///
/// Renames applied one by one only work while each new codename is free.
/// When a paired member would take a codename another target member still
/// holds (any reorder of existing options), the whole array is replaced
/// instead.
#[derive(Debug, Clone, Copy)]
pub struct Positional<H> {
    element: H,
}

impl<H> Positional<H> {
    pub fn new(element: H) -> Self {
        Self { element }
    }
}

impl<T, H> Handler<Vec<T>> for Positional<H>
where
    T: Keyed + Serialize,
    H: Handler<T>,
{
    fn diff(&self, source: &Vec<T>, target: &Vec<T>) -> Vec<PatchOperation> {
        if renames_collide(source, target) {
            return vec![PatchOperation::replace("", source, target)];
        }

        let mut ops = Vec::new();
        for i in 0..source.len().max(target.len()) {
            match (source.get(i), target.get(i)) {
                (Some(s), Some(t)) => {
                    let prefix = codename_segment(t.codename());
                    ops.extend(self.element.diff(s, t).into_iter().map(|op| op.prefixed(&prefix)));
                }
                (Some(s), None) => ops.push(PatchOperation::add_into("", s)),
                (None, Some(t)) => ops.push(PatchOperation::remove(codename_segment(t.codename()), t)),
                (None, None) => {}
            }
        }
        ops
    }
}

fn renames_collide<T: Keyed>(source: &[T], target: &[T]) -> bool {
    source.iter().zip(target).any(|(s, t)| {
        s.codename() != t.codename() && target.iter().any(|other| other.codename() == s.codename())
    })
}
