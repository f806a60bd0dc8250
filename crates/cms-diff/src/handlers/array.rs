//! Identity-keyed array comparison

use std::collections::HashMap;

use cms_model::Keyed;
use serde::Serialize;

use crate::handler::Handler;
use crate::operation::PatchOperation;
use crate::path::codename_segment;

/// Compares arrays whose members are identified by codename.
///
/// Members only in the source are added, members only in the target are
/// removed, and members on both sides are compared with the element handler
/// with their operations prefixed by `/codename:<key>`. Member order is
/// ignored; wrap in [`Ordered`](super::Ordered) when it matters.
///
/// When the element handler reports removal of the member itself (a
/// [`Union`](super::Union) kind change) the member is swapped: removed by
/// key and added back whole, as an adjacent pair.
#[derive(Debug, Clone, Copy)]
pub struct KeyedArray<H> {
    element: H,
}

impl<H> KeyedArray<H> {
    pub fn new(element: H) -> Self {
        Self { element }
    }

    /// Compare two member slices; the [`Handler`] impl delegates here
    pub fn diff_members<T>(&self, source: &[T], target: &[T]) -> Vec<PatchOperation>
    where
        T: Keyed + Serialize,
        H: Handler<T>,
    {
        let target_by_key: HashMap<&str, &T> = target.iter().map(|t| (t.codename(), t)).collect();
        let mut ops = Vec::new();

        for s in source {
            let key = s.codename();
            let Some(t) = target_by_key.get(key) else {
                ops.push(PatchOperation::add_into("", s));
                continue;
            };

            let nested = self.element.diff(s, t);
            let swapped = nested
                .iter()
                .any(|op| matches!(op, PatchOperation::Remove { path, .. } if path.is_empty()));
            if swapped {
                ops.push(PatchOperation::remove(codename_segment(key), *t));
                ops.push(PatchOperation::add_into("", s));
            } else {
                let prefix = codename_segment(key);
                ops.extend(nested.into_iter().map(|op| op.prefixed(&prefix)));
            }
        }

        let source_keys: Vec<&str> = source.iter().map(Keyed::codename).collect();
        for t in target {
            if !source_keys.contains(&t.codename()) {
                ops.push(PatchOperation::remove(codename_segment(t.codename()), t));
            }
        }

        ops
    }
}

impl<T, H> Handler<Vec<T>> for KeyedArray<H>
where
    T: Keyed + Serialize,
    H: Handler<T>,
{
    fn diff(&self, source: &Vec<T>, target: &Vec<T>) -> Vec<PatchOperation> {
        self.diff_members(source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Constant, Leaf, ObjectDiff};
    use crate::handlers::Union;
    use cms_model::element::{GuidelinesElement, SnippetElement};
    use cms_model::{CodenameRef, Collection, Element, ElementData};
    use pretty_assertions::assert_eq;

    fn collection(codename: &str, name: &str) -> Collection {
        Collection {
            name: name.into(),
            codename: codename.into(),
            external_id: None,
        }
    }

    fn diff_collection(s: &Collection, t: &Collection) -> Vec<PatchOperation> {
        ObjectDiff::new(s, t).field("name", |c| &c.name, Leaf).finish()
    }

    #[test]
    fn adds_removes_and_recurses_by_key() {
        let source = vec![collection("a", "A"), collection("b", "Bee")];
        let target = vec![collection("b", "B"), collection("c", "C")];

        let ops = KeyedArray::new(diff_collection).diff(&source, &target);

        assert_eq!(
            ops,
            vec![
                PatchOperation::add_into("", &source[0]),
                PatchOperation::replace("/codename:b/name", "Bee", "B"),
                PatchOperation::remove("/codename:c", &target[1]),
            ]
        );
    }

    #[test]
    fn kind_change_becomes_adjacent_swap() {
        let source = vec![Element::new(
            "body",
            ElementData::Snippet(SnippetElement {
                snippet: CodenameRef::new("seo"),
            }),
        )];
        let target = vec![Element::new(
            "body",
            ElementData::Guidelines(GuidelinesElement {
                guidelines: "Write well".into(),
            }),
        )];

        let element = |s: &Element, t: &Element| {
            ObjectDiff::new(s, t)
                .flatten(|e| &e.data, Union::new(ElementData::kind, Constant))
                .finish()
        };
        let ops = KeyedArray::new(element).diff(&source, &target);

        assert_eq!(
            ops,
            vec![
                PatchOperation::remove("/codename:body", &target[0]),
                PatchOperation::add_into("", &source[0]),
            ]
        );
    }
}
