//! Operation ordering within one entity's update batch

use crate::operation::{OperationKind, PatchOperation};
use crate::path::codename_segment;

/// Stably order operations as additions, replacements, removals, moves.
///
/// A `remove` of an array member immediately followed by an `addInto` of a
/// member with the same codename into that array is a kind swap; the pair
/// stays adjacent and ranks with the replacements.
pub fn adjust(ops: Vec<PatchOperation>) -> Vec<PatchOperation> {
    let mut groups: Vec<(u8, Vec<PatchOperation>)> = Vec::with_capacity(ops.len());
    let mut iter = ops.into_iter().peekable();

    while let Some(op) = iter.next() {
        if let Some(add) = iter.next_if(|next| is_swap_pair(&op, next)) {
            groups.push((1, vec![op, add]));
            continue;
        }
        let rank = match op.kind() {
            OperationKind::AddInto => 0,
            OperationKind::Replace => 1,
            OperationKind::Remove => 2,
            OperationKind::Move => 3,
        };
        groups.push((rank, vec![op]));
    }

    groups.sort_by_key(|(rank, _)| *rank);
    groups.into_iter().flat_map(|(_, ops)| ops).collect()
}

fn is_swap_pair(remove: &PatchOperation, add: &PatchOperation) -> bool {
    let (PatchOperation::Remove { path, .. }, PatchOperation::AddInto { path: array, .. }) = (remove, add)
    else {
        return false;
    };
    add.added_codename()
        .is_some_and(|codename| *path == format!("{}{}", array, codename_segment(codename)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn orders_by_kind_stably() {
        let ops = vec![
            PatchOperation::remove("/terms/codename:a", &json!({"codename": "a"})),
            PatchOperation::replace("/name", &"New", &"Old"),
            PatchOperation::add_into("/terms", &json!({"codename": "b"})),
            PatchOperation::replace("/codename:c/name", &"C", &"c"),
            PatchOperation::add_into("/terms", &json!({"codename": "d"})),
        ];

        let paths: Vec<String> = adjust(ops)
            .iter()
            .map(|op| format!("{} {}", op.kind(), op.path()))
            .collect();

        assert_eq!(
            paths,
            vec![
                "addInto /terms",
                "addInto /terms",
                "replace /name",
                "replace /codename:c/name",
                "remove /terms/codename:a",
            ]
        );
    }

    #[test]
    fn swap_pairs_stay_adjacent() {
        let ops = vec![
            PatchOperation::remove("/elements/codename:body", &json!({"codename": "body", "type": "rich_text"})),
            PatchOperation::add_into("/elements", &json!({"codename": "body", "type": "custom"})),
            PatchOperation::add_into("/elements", &json!({"codename": "summary", "type": "text"})),
            PatchOperation::remove("/elements/codename:legacy", &json!({"codename": "legacy"})),
        ];

        let adjusted = adjust(ops);
        let summary: Vec<String> = adjusted.iter().map(|op| op.to_string()).collect();

        assert_eq!(
            summary,
            vec![
                "addInto /elements",
                "remove /elements/codename:body",
                "addInto /elements",
                "remove /elements/codename:legacy",
            ]
        );
        assert_eq!(adjusted[2].added_codename(), Some("body"));
    }
}
