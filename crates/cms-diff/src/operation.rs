//! Patch operations
//!
//! Operations describe how to turn a target value into a source value.
//! Their wire shape is `{op, path, value?, oldValue?, before?, after?}`.

use std::fmt;

use cms_model::CodenameRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position of an inserted or moved array member relative to a sibling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Before(String),
    After(String),
}

impl Anchor {
    pub fn codename(&self) -> &str {
        match self {
            Self::Before(c) | Self::After(c) => c,
        }
    }

    fn into_refs(anchor: Option<Anchor>) -> (Option<CodenameRef>, Option<CodenameRef>) {
        match anchor {
            Some(Self::Before(c)) => (Some(CodenameRef::new(c)), None),
            Some(Self::After(c)) => (None, Some(CodenameRef::new(c))),
            None => (None, None),
        }
    }

    fn from_refs(before: &Option<CodenameRef>, after: &Option<CodenameRef>) -> Option<Anchor> {
        match (before, after) {
            (Some(b), _) => Some(Self::Before(b.codename.clone())),
            (None, Some(a)) => Some(Self::After(a.codename.clone())),
            (None, None) => None,
        }
    }
}

/// A single change to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PatchOperation {
    /// Insert `value` into the array at `path`
    AddInto {
        path: String,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<CodenameRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<CodenameRef>,
    },
    Remove {
        path: String,
        #[serde(rename = "oldValue")]
        old_value: Value,
    },
    Replace {
        path: String,
        value: Value,
        #[serde(rename = "oldValue")]
        old_value: Value,
    },
    /// Reposition the array member at `path`
    Move {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<CodenameRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<CodenameRef>,
    },
}

/// Operation kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    AddInto,
    Remove,
    Replace,
    Move,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddInto => "addInto",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

impl PatchOperation {
    pub fn add_into<T: Serialize + ?Sized>(path: impl Into<String>, value: &T) -> Self {
        Self::AddInto {
            path: path.into(),
            value: to_value(value),
            before: None,
            after: None,
        }
    }

    pub fn remove<T: Serialize + ?Sized>(path: impl Into<String>, old_value: &T) -> Self {
        Self::Remove {
            path: path.into(),
            old_value: to_value(old_value),
        }
    }

    pub fn replace<T: Serialize + ?Sized>(path: impl Into<String>, value: &T, old_value: &T) -> Self {
        Self::Replace {
            path: path.into(),
            value: to_value(value),
            old_value: to_value(old_value),
        }
    }

    pub fn move_to(path: impl Into<String>, anchor: Anchor) -> Self {
        let (before, after) = Anchor::into_refs(Some(anchor));
        Self::Move {
            path: path.into(),
            before,
            after,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::AddInto { .. } => OperationKind::AddInto,
            Self::Remove { .. } => OperationKind::Remove,
            Self::Replace { .. } => OperationKind::Replace,
            Self::Move { .. } => OperationKind::Move,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::AddInto { path, .. }
            | Self::Remove { path, .. }
            | Self::Replace { path, .. }
            | Self::Move { path, .. } => path,
        }
    }

    pub fn path_mut(&mut self) -> &mut String {
        match self {
            Self::AddInto { path, .. }
            | Self::Remove { path, .. }
            | Self::Replace { path, .. }
            | Self::Move { path, .. } => path,
        }
    }

    /// The new value carried by `addInto` and `replace`
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::AddInto { value, .. } | Self::Replace { value, .. } => Some(value),
            Self::Remove { .. } | Self::Move { .. } => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        match self {
            Self::AddInto { value, .. } | Self::Replace { value, .. } => Some(value),
            Self::Remove { .. } | Self::Move { .. } => None,
        }
    }

    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            Self::AddInto { before, after, .. } | Self::Move { before, after, .. } => {
                Anchor::from_refs(before, after)
            }
            Self::Remove { .. } | Self::Replace { .. } => None,
        }
    }

    /// Set the position of an `addInto` or `move`; other kinds are unchanged
    pub fn with_anchor(mut self, anchor: Option<Anchor>) -> Self {
        if let Self::AddInto { before, after, .. } | Self::Move { before, after, .. } = &mut self {
            (*before, *after) = Anchor::into_refs(anchor);
        }
        self
    }

    /// Prepend `prefix` to the path
    pub fn prefixed(mut self, prefix: &str) -> Self {
        let path = self.path_mut();
        path.insert_str(0, prefix);
        self
    }

    /// Codename carried by the inserted value of an `addInto`
    pub fn added_codename(&self) -> Option<&str> {
        match self {
            Self::AddInto { value, .. } => value.get("codename").and_then(Value::as_str),
            _ => None,
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path().is_empty() { "/" } else { self.path() };
        write!(f, "{} {}", self.kind(), path)?;
        match self.anchor() {
            Some(Anchor::Before(c)) => write!(f, " (before {})", c),
            Some(Anchor::After(c)) => write!(f, " (after {})", c),
            None => Ok(()),
        }
    }
}
