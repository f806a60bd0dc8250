//! Pointer paths with codename addressing
//!
//! Paths are JSON-Pointer-like strings. Array members are addressed by the
//! codename of the member instead of by index, so an operation stays valid
//! when unrelated siblings are reordered.
//!
//! # Path Syntax
//!
//! - Object key: `/name`
//! - Array member by codename: `/elements/codename:body`
//! - Combined: `/elements/codename:body/allowed_content_types`
//! - The empty path addresses the document itself
//!
//! # Examples
//!
//! ```
//! use cms_diff::path::{parse_path, get_at_path, PathSegment};
//! use serde_json::json;
//!
//! let path = parse_path("/terms/codename:red/name");
//! assert_eq!(path, vec![
//!     PathSegment::Key("terms".to_string()),
//!     PathSegment::Codename("red".to_string()),
//!     PathSegment::Key("name".to_string()),
//! ]);
//!
//! let value = json!({"terms": [{"codename": "red", "name": "Red"}]});
//! assert_eq!(get_at_path(&value, &path), Some(&json!("Red")));
//! ```

use serde_json::Value;

const CODENAME_PREFIX: &str = "codename:";

/// A segment of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A key in an object
    Key(String),
    /// The member of an array whose `codename` matches
    Codename(String),
}

/// Path segment addressing the array member with `codename`
pub fn codename_segment(codename: &str) -> String {
    format!("/{}{}", CODENAME_PREFIX, codename)
}

/// Parse a path string into segments.
///
/// Empty segments (a leading `/`, doubled separators) are skipped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(CODENAME_PREFIX) {
            Some(codename) => PathSegment::Codename(codename.to_string()),
            None => PathSegment::Key(s.to_string()),
        })
        .collect()
}

/// Render segments back into a path string
pub fn format_path(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            PathSegment::Key(key) => format!("/{}", key),
            PathSegment::Codename(codename) => codename_segment(codename),
        })
        .collect()
}

/// Index of the member of `items` whose `codename` equals `codename`
pub fn position_of(items: &[Value], codename: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.get("codename").and_then(Value::as_str) == Some(codename))
}

/// Get the value at the given path, or `None` if the path doesn't exist.
pub fn get_at_path<'v>(value: &'v Value, segments: &[PathSegment]) -> Option<&'v Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    let next_value = match first {
        PathSegment::Key(key) => value.get(key)?,
        PathSegment::Codename(codename) => {
            let items = value.as_array()?;
            &items[position_of(items, codename)?]
        }
    };

    get_at_path(next_value, rest)
}

/// Mutable counterpart of [`get_at_path`]
pub fn get_at_path_mut<'v>(value: &'v mut Value, segments: &[PathSegment]) -> Option<&'v mut Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    let next_value = match first {
        PathSegment::Key(key) => value.get_mut(key)?,
        PathSegment::Codename(codename) => {
            let items = value.as_array_mut()?;
            let index = position_of(items, codename)?;
            &mut items[index]
        }
    };

    get_at_path_mut(next_value, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_empty_path() {
        assert!(parse_path("").is_empty());
        assert!(parse_path("/").is_empty());
    }

    #[test]
    fn test_format_round_trips() {
        let path = "/elements/codename:body/allowed_content_types/codename:article";
        assert_eq!(format_path(&parse_path(path)), path);
    }

    #[test]
    fn test_get_nested_codename() {
        let value = json!({
            "terms": [
                {"codename": "warm", "terms": [{"codename": "red", "name": "Red"}]}
            ]
        });
        let path = parse_path("/terms/codename:warm/terms/codename:red/name");
        assert_eq!(get_at_path(&value, &path), Some(&json!("Red")));
    }

    #[test]
    fn test_get_missing_codename() {
        let value = json!({"terms": [{"codename": "warm"}]});
        assert_eq!(get_at_path(&value, &parse_path("/terms/codename:cold")), None);
        assert_eq!(get_at_path(&value, &parse_path("/name/codename:x")), None);
    }

    #[test]
    fn test_get_mut_replaces_member_field() {
        let mut value = json!([{"codename": "en", "name": "English"}]);
        let path = parse_path("/codename:en/name");
        *get_at_path_mut(&mut value, &path).unwrap() = json!("English (US)");
        assert_eq!(value, json!([{"codename": "en", "name": "English (US)"}]));
    }
}
