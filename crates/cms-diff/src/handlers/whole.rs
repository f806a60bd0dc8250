//! Set-difference comparison for members without intra-member patches

use cms_model::Keyed;
use serde::Serialize;

use crate::handler::Handler;
use crate::operation::PatchOperation;
use crate::path::codename_segment;

/// Compares keyed arrays whose members can only be swapped in or out.
///
/// A member whose content differs under the same key is removed and added
/// back whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whole;

impl<T> Handler<Vec<T>> for Whole
where
    T: Keyed + Serialize + PartialEq,
{
    fn diff(&self, source: &Vec<T>, target: &Vec<T>) -> Vec<PatchOperation> {
        let mut ops = Vec::new();
        for s in source {
            match target.iter().find(|t| t.codename() == s.codename()) {
                None => ops.push(PatchOperation::add_into("", s)),
                Some(t) if t != s => {
                    ops.push(PatchOperation::remove(codename_segment(t.codename()), t));
                    ops.push(PatchOperation::add_into("", s));
                }
                Some(_) => {}
            }
        }
        for t in target {
            if !source.iter().any(|s| s.codename() == t.codename()) {
                ops.push(PatchOperation::remove(codename_segment(t.codename()), t));
            }
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_model::CodenameRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_difference_only() {
        let source = vec![CodenameRef::new("marketing"), CodenameRef::new("default")];
        let target = vec![CodenameRef::new("default"), CodenameRef::new("legal")];

        let ops = Whole.diff(&source, &target);

        assert_eq!(
            ops,
            vec![
                PatchOperation::add_into("", &source[0]),
                PatchOperation::remove("/codename:legal", &target[1]),
            ]
        );
    }
}
