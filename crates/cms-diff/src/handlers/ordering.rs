//! Order reconciliation for keyed arrays
//!
//! Members present on both sides keep their place when they belong to one
//! longest run whose relative order already agrees with the source; every
//! other common member gets one `move`. Added members are positioned at
//! insertion time next to their source-order neighbours.
//!
//! Operations are applied in phases (see [`adjust`](crate::adjust::adjust)):
//! additions, then kind swaps, then moves. Each positioned member anchors on
//! its nearest preceding source neighbour that is already in place when its
//! phase runs, or failing that on its nearest following neighbour from an
//! earlier phase. Applying the phases in order therefore reproduces the
//! source order exactly.

use std::collections::{HashMap, HashSet};

use cms_model::Keyed;
use serde::Serialize;

use crate::handler::Handler;
use crate::handlers::KeyedArray;
use crate::operation::{Anchor, OperationKind, PatchOperation};
use crate::path::codename_segment;

/// A keyed array whose member order is meaningful
#[derive(Debug, Clone, Copy)]
pub struct Ordered<H>(pub KeyedArray<H>);

impl<H> Ordered<H> {
    pub fn new(element: H) -> Self {
        Self(KeyedArray::new(element))
    }
}

impl<T, H> Handler<Vec<T>> for Ordered<H>
where
    T: Keyed + Serialize,
    H: Handler<T>,
{
    fn diff(&self, source: &Vec<T>, target: &Vec<T>) -> Vec<PatchOperation> {
        let ops = self.0.diff_members(source, target);

        let source_keys: Vec<&str> = source.iter().map(Keyed::codename).collect();
        let target_keys: Vec<&str> = target.iter().map(Keyed::codename).collect();
        let swapped: HashSet<&str> = source_keys
            .iter()
            .copied()
            .filter(|key| target_keys.contains(key))
            .filter(|key| {
                let path = codename_segment(key);
                ops.iter()
                    .any(|op| op.kind() == OperationKind::Remove && op.path() == path)
            })
            .collect();

        let placement = place(&source_keys, &target_keys, &swapped);

        let mut ops: Vec<PatchOperation> = ops
            .into_iter()
            .map(|op| {
                if op.kind() != OperationKind::AddInto || !op.path().is_empty() {
                    return op;
                }
                let anchor = op
                    .added_codename()
                    .and_then(|key| placement.anchors.get(key).cloned().flatten());
                op.with_anchor(anchor)
            })
            .collect();

        ops.extend(
            placement
                .moves
                .into_iter()
                .map(|(key, anchor)| PatchOperation::move_to(codename_segment(key), anchor)),
        );
        ops
    }
}

/// Moves that reorder a list into source order.
///
/// The list is assumed to hold the target members still present in the
/// source, in target order, followed by the members added from the source,
/// in source order.
pub fn reorder_moves<T: Keyed>(source: &[T], target: &[T]) -> Vec<PatchOperation> {
    let source_keys: Vec<&str> = source.iter().map(Keyed::codename).collect();
    let mut resulting: Vec<&str> = target
        .iter()
        .map(Keyed::codename)
        .filter(|key| source_keys.contains(key))
        .collect();
    let added: Vec<&str> = source_keys
        .iter()
        .copied()
        .filter(|key| !resulting.contains(key))
        .collect();
    resulting.extend(added);

    place(&source_keys, &resulting, &HashSet::new())
        .moves
        .into_iter()
        .map(|(key, anchor)| PatchOperation::move_to(codename_segment(key), anchor))
        .collect()
}

/// When a member gets positioned; stable members come first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Stable,
    Added,
    Swapped,
    Moved,
}

struct Placement<'k> {
    /// Insertion anchor of each added or swapped member
    anchors: HashMap<&'k str, Option<Anchor>>,
    moves: Vec<(&'k str, Anchor)>,
}

fn place<'k>(source: &[&'k str], target: &[&str], swapped: &HashSet<&str>) -> Placement<'k> {
    let source_index: HashMap<&str, usize> =
        source.iter().enumerate().map(|(i, key)| (*key, i)).collect();
    let target_keys: HashSet<&str> = target.iter().copied().collect();

    // Source positions of the common, unswapped members in target order
    let common: Vec<usize> = target
        .iter()
        .filter_map(|key| source_index.get(key).copied())
        .filter(|&i| !swapped.contains(source[i]))
        .collect();
    let stable: HashSet<usize> = longest_increasing(&common)
        .into_iter()
        .map(|p| common[p])
        .collect();

    let phases: Vec<Phase> = source
        .iter()
        .enumerate()
        .map(|(i, key)| {
            if !target_keys.contains(key) {
                Phase::Added
            } else if swapped.contains(key) {
                Phase::Swapped
            } else if stable.contains(&i) {
                Phase::Stable
            } else {
                Phase::Moved
            }
        })
        .collect();

    let mut placement = Placement {
        anchors: HashMap::new(),
        moves: Vec::new(),
    };

    for (i, &phase) in phases.iter().enumerate() {
        if phase == Phase::Stable {
            continue;
        }
        let anchor = (0..i)
            .rev()
            .find(|&j| phases[j] <= phase)
            .map(|j| Anchor::After(source[j].to_string()))
            .or_else(|| {
                (i + 1..source.len())
                    .find(|&j| phases[j] < phase)
                    .map(|j| Anchor::Before(source[j].to_string()))
            });

        match (phase, anchor) {
            (Phase::Moved, Some(anchor)) => placement.moves.push((source[i], anchor)),
            // A moved member always has a neighbour: at least one common
            // member is stable.
            (Phase::Moved, None) => {}
            (_, anchor) => {
                placement.anchors.insert(source[i], anchor);
            }
        }
    }

    placement
}

/// Positions in `seq` of one longest strictly increasing subsequence
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &x) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&t| seq[t] < x);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut out = Vec::with_capacity(tails.len());
    let mut cur = tails.last().copied();
    while let Some(i) = cur {
        out.push(i);
        cur = prev[i];
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Constant;
    use cms_model::CodenameRef;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn refs(keys: &[&str]) -> Vec<CodenameRef> {
        keys.iter().map(|k| CodenameRef::new(*k)).collect()
    }

    #[rstest]
    #[case(&[3, 1, 2], 2)]
    #[case(&[0, 1, 2, 3], 4)]
    #[case(&[3, 2, 1, 0], 1)]
    #[case(&[], 0)]
    #[case(&[2, 0, 3, 1, 4], 3)]
    fn lis_length(#[case] seq: &[usize], #[case] expected: usize) {
        let positions = longest_increasing(seq);
        assert_eq!(positions.len(), expected);
        assert!(positions.windows(2).all(|w| w[0] < w[1] && seq[w[0]] < seq[w[1]]));
    }

    #[test]
    fn swapped_pair_needs_one_move() {
        let ops = Ordered::new(Constant).diff(&refs(&["b", "a"]), &refs(&["a", "b"]));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind(), OperationKind::Move);
    }

    #[test]
    fn added_member_follows_source_predecessor() {
        let ops = Ordered::new(Constant).diff(&refs(&["red", "green", "blue"]), &refs(&["red", "blue"]));
        assert_eq!(
            ops,
            vec![PatchOperation::add_into("", &CodenameRef::new("green"))
                .with_anchor(Some(Anchor::After("red".into())))]
        );
    }

    #[test]
    fn added_first_member_goes_before_first_stable() {
        let ops = Ordered::new(Constant).diff(&refs(&["new", "old"]), &refs(&["old"]));
        assert_eq!(ops[0].anchor(), Some(Anchor::Before("old".into())));
    }

    #[test]
    fn unchanged_order_emits_nothing() {
        let keys = refs(&["a", "b", "c"]);
        assert!(Ordered::new(Constant).diff(&keys, &keys).is_empty());
    }

    #[test]
    fn reorder_moves_accounts_for_appended_additions() {
        // After additions the list is [a, b, c]; source wants c first
        let moves = reorder_moves(&refs(&["c", "a", "b"]), &refs(&["a", "b"]));
        assert_eq!(
            moves,
            vec![PatchOperation::move_to("/codename:c", Anchor::Before("a".into()))]
        );
    }
}
