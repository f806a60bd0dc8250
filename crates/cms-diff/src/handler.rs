//! The handler abstraction and its scalar and object combinators
//!
//! A handler compares a source and a target value of the same shape and
//! returns the operations that turn the target into the source. Paths are
//! relative to the compared value; the caller prefixes them.

use serde::Serialize;

use crate::operation::PatchOperation;

/// Pure comparison of two values of identical shape
pub trait Handler<T: ?Sized> {
    fn diff(&self, source: &T, target: &T) -> Vec<PatchOperation>;
}

impl<T: ?Sized, F> Handler<T> for F
where
    F: Fn(&T, &T) -> Vec<PatchOperation>,
{
    fn diff(&self, source: &T, target: &T) -> Vec<PatchOperation> {
        self(source, target)
    }
}

/// Equality check: nothing, or one `replace` of the whole value
#[derive(Debug, Clone, Copy, Default)]
pub struct Leaf;

impl<T: PartialEq + Serialize + ?Sized> Handler<T> for Leaf {
    fn diff(&self, source: &T, target: &T) -> Vec<PatchOperation> {
        if source == target {
            Vec::new()
        } else {
            vec![PatchOperation::replace("", source, target)]
        }
    }
}

/// Never reports a difference
#[derive(Debug, Clone, Copy, Default)]
pub struct Constant;

impl<T: ?Sized> Handler<T> for Constant {
    fn diff(&self, _source: &T, _target: &T) -> Vec<PatchOperation> {
        Vec::new()
    }
}

/// Lifts a handler over a value that may be absent.
///
/// When only one side is present the whole value is replaced.
#[derive(Debug, Clone, Copy)]
pub struct Optional<H>(pub H);

impl<T: Serialize, H: Handler<T>> Handler<Option<T>> for Optional<H> {
    fn diff(&self, source: &Option<T>, target: &Option<T>) -> Vec<PatchOperation> {
        match (source, target) {
            (Some(s), Some(t)) => self.0.diff(s, t),
            (None, None) => Vec::new(),
            _ => vec![PatchOperation::replace("", source, target)],
        }
    }
}

/// The enclosing source and target objects of a value being compared
pub struct Context<'c, C: ?Sized> {
    pub source: &'c C,
    pub target: &'c C,
}

impl<C: ?Sized> Clone for Context<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for Context<'_, C> {}

impl<'c, C: ?Sized> Context<'c, C> {
    pub fn new(source: &'c C, target: &'c C) -> Self {
        Self { source, target }
    }
}

/// A handler that also sees the parents of the compared values
pub trait ContextHandler<T: ?Sized, C: ?Sized> {
    fn diff_in(&self, source: &T, target: &T, context: Context<'_, C>) -> Vec<PatchOperation>;
}

impl<T: ?Sized, C: ?Sized, F> ContextHandler<T, C> for F
where
    F: Fn(&T, &T, Context<'_, C>) -> Vec<PatchOperation>,
{
    fn diff_in(&self, source: &T, target: &T, context: Context<'_, C>) -> Vec<PatchOperation> {
        self(source, target, context)
    }
}

/// Binds a context to a [`ContextHandler`], making it a plain [`Handler`]
pub struct WithContext<'c, H, C: ?Sized> {
    handler: H,
    context: Context<'c, C>,
}

impl<'c, H, C: ?Sized> WithContext<'c, H, C> {
    pub fn new(handler: H, context: Context<'c, C>) -> Self {
        Self { handler, context }
    }
}

impl<T: ?Sized, C: ?Sized, H: ContextHandler<T, C>> Handler<T> for WithContext<'_, H, C> {
    fn diff(&self, source: &T, target: &T) -> Vec<PatchOperation> {
        self.handler.diff_in(source, target, self.context)
    }
}

/// Field-by-field comparison of a struct.
///
/// Each declared field is compared with its own handler and the resulting
/// paths are prefixed with `/<field>`. Flattened fields contribute their
/// operations unprefixed.
///
/// ```
/// use cms_diff::handler::{Constant, Leaf, ObjectDiff};
/// use cms_model::Collection;
///
/// fn diff_collection(source: &Collection, target: &Collection) -> Vec<cms_diff::PatchOperation> {
///     ObjectDiff::new(source, target)
///         .field("name", |c| &c.name, Leaf)
///         .field("codename", |c| &c.codename, Constant)
///         .finish()
/// }
/// ```
pub struct ObjectDiff<'a, T: ?Sized> {
    source: &'a T,
    target: &'a T,
    ops: Vec<PatchOperation>,
}

impl<'a, T: ?Sized> ObjectDiff<'a, T> {
    pub fn new(source: &'a T, target: &'a T) -> Self {
        Self {
            source,
            target,
            ops: Vec::new(),
        }
    }

    pub fn field<F, G, H>(mut self, name: &str, get: G, handler: H) -> Self
    where
        F: ?Sized + 'a,
        G: Fn(&'a T) -> &'a F,
        H: Handler<F>,
    {
        let prefix = format!("/{}", name);
        let ops = handler.diff(get(self.source), get(self.target));
        self.ops.extend(ops.into_iter().map(|op| op.prefixed(&prefix)));
        self
    }

    /// A field whose handler also receives the parents of this object
    pub fn field_in_context<F, C, G, H>(
        mut self,
        name: &str,
        get: G,
        context: Context<'_, C>,
        handler: H,
    ) -> Self
    where
        F: ?Sized + 'a,
        C: ?Sized,
        G: Fn(&'a T) -> &'a F,
        H: ContextHandler<F, C>,
    {
        let prefix = format!("/{}", name);
        let ops = handler.diff_in(get(self.source), get(self.target), context);
        self.ops.extend(ops.into_iter().map(|op| op.prefixed(&prefix)));
        self
    }

    /// A nested value whose fields live at this object's level
    pub fn flatten<F, G, H>(mut self, get: G, handler: H) -> Self
    where
        F: ?Sized + 'a,
        G: Fn(&'a T) -> &'a F,
        H: Handler<F>,
    {
        self.ops.extend(handler.diff(get(self.source), get(self.target)));
        self
    }

    pub fn finish(self) -> Vec<PatchOperation> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Serialize, PartialEq)]
    struct Limit {
        value: u32,
        condition: String,
    }

    struct Parent {
        flag: bool,
        name: String,
    }

    #[test]
    fn leaf_replaces_whole_value() {
        assert!(Leaf.diff(&1, &1).is_empty());
        assert_eq!(
            Leaf.diff("new", "old"),
            vec![PatchOperation::replace("", "new", "old")]
        );
    }

    #[test]
    fn optional_replaces_on_presence_change() {
        let some = Some(Limit {
            value: 3,
            condition: "at_most".into(),
        });
        let ops = Optional(Constant).diff(&some, &None);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind(), OperationKind::Replace);
        assert_eq!(ops[0].value(), Some(&json!({"value": 3, "condition": "at_most"})));

        let other = Some(Limit {
            value: 5,
            condition: "exactly".into(),
        });
        assert!(Optional(Constant).diff(&some, &other).is_empty());
    }

    #[test]
    fn object_prefixes_field_paths() {
        let source = Limit {
            value: 3,
            condition: "at_most".into(),
        };
        let target = Limit {
            value: 4,
            condition: "at_most".into(),
        };

        let ops = ObjectDiff::new(&source, &target)
            .field("value", |l| &l.value, Leaf)
            .field("condition", |l| &l.condition, Leaf)
            .finish();

        assert_eq!(ops, vec![PatchOperation::replace("/value", &3, &4)]);
    }

    #[test]
    fn contextful_field_sees_parents() {
        let source = Parent {
            flag: false,
            name: "a".into(),
        };
        let target = Parent {
            flag: true,
            name: "b".into(),
        };

        fn only_when_source_flagged(s: &String, t: &String, ctx: Context<'_, Parent>) -> Vec<PatchOperation> {
            if ctx.source.flag { Leaf.diff(s, t) } else { Vec::new() }
        }

        let ops = ObjectDiff::new(&source, &target)
            .field_in_context("name", |p| &p.name, Context::new(&source, &target), only_when_source_flagged)
            .finish();
        assert!(ops.is_empty());

        let ops = ObjectDiff::new(&target, &source)
            .field_in_context("name", |p| &p.name, Context::new(&target, &source), only_when_source_flagged)
            .finish();
        assert_eq!(ops, vec![PatchOperation::replace("/name", "b", "a")]);
    }
}
