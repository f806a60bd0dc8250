//! Discriminator-keyed comparison of polymorphic values

use serde::Serialize;

use crate::handler::Handler;
use crate::operation::PatchOperation;

/// Compares values of a closed tagged union.
///
/// When the discriminators differ no structural diff is attempted across the
/// unrelated shapes: the old value is removed and the new one added, in that
/// order. Otherwise the same-kind handler compares the values; it may treat
/// mismatched variants as unreachable.
#[derive(Debug, Clone, Copy)]
pub struct Union<D, H> {
    discriminator: D,
    same_kind: H,
}

impl<D, H> Union<D, H> {
    pub fn new(discriminator: D, same_kind: H) -> Self {
        Self {
            discriminator,
            same_kind,
        }
    }
}

impl<T, K, D, H> Handler<T> for Union<D, H>
where
    T: Serialize + ?Sized,
    K: PartialEq,
    D: Fn(&T) -> K,
    H: Handler<T>,
{
    fn diff(&self, source: &T, target: &T) -> Vec<PatchOperation> {
        if (self.discriminator)(source) != (self.discriminator)(target) {
            vec![
                PatchOperation::remove("", target),
                PatchOperation::add_into("", source),
            ]
        } else {
            self.same_kind.diff(source, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Leaf;
    use crate::operation::OperationKind;

    #[derive(Serialize, PartialEq)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum Shape {
        Circle { radius: u32 },
        Square { side: u32 },
    }

    fn tag(shape: &Shape) -> &'static str {
        match shape {
            Shape::Circle { .. } => "circle",
            Shape::Square { .. } => "square",
        }
    }

    #[test]
    fn kind_change_is_remove_then_add() {
        let ops = Union::new(tag, Leaf).diff(&Shape::Circle { radius: 1 }, &Shape::Square { side: 1 });
        let kinds: Vec<_> = ops.iter().map(PatchOperation::kind).collect();
        assert_eq!(kinds, vec![OperationKind::Remove, OperationKind::AddInto]);
    }

    #[test]
    fn same_kind_delegates() {
        let ops = Union::new(tag, Leaf).diff(&Shape::Circle { radius: 1 }, &Shape::Circle { radius: 2 });
        let kinds: Vec<_> = ops.iter().map(PatchOperation::kind).collect();
        assert_eq!(kinds, vec![OperationKind::Replace]);
    }
}
