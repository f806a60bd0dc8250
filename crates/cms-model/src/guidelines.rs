//! Item and asset references embedded in guidelines HTML
//!
//! Guidelines are rich text, and links to content items or assets appear as
//! `data-item-*` / `data-asset-*` attributes. Only those attributes are
//! touched; the surrounding markup is never parsed.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::kind::ReferenceKind;
use crate::reference::placeholder_external_id;

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-(item|asset)-id="([^"]*)""#).unwrap());

static CODENAME_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-(item|asset)-codename="([^"]*)""#).unwrap());

fn reference_kind(caps: &Captures<'_>) -> ReferenceKind {
    match &caps[1] {
        "asset" => ReferenceKind::Asset,
        _ => ReferenceKind::Item,
    }
}

fn placeholder_attr(kind: ReferenceKind, old_id: &str) -> String {
    format!(
        r#"data-{}-external-id="{}""#,
        kind.as_str(),
        placeholder_external_id(kind, old_id)
    )
}

/// Replace internal-id attributes with codename attributes.
///
/// Ids `lookup` cannot map become a placeholder external-id attribute
/// derived from the id.
pub fn ids_to_codenames<F>(html: &str, lookup: F) -> String
where
    F: Fn(ReferenceKind, &str) -> Option<String>,
{
    ID_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let kind = reference_kind(caps);
            match lookup(kind, &caps[2]) {
                Some(codename) => format!(r#"data-{}-codename="{}""#, kind.as_str(), codename),
                None => placeholder_attr(kind, &caps[2]),
            }
        })
        .into_owned()
}

/// Replace codename attributes with the ids of the entities on a target.
///
/// Codenames `lookup` cannot map become a placeholder external-id attribute
/// derived from the codename.
pub fn codenames_to_ids<F>(html: &str, lookup: F) -> String
where
    F: Fn(ReferenceKind, &str) -> Option<String>,
{
    CODENAME_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let kind = reference_kind(caps);
            match lookup(kind, &caps[2]) {
                Some(id) => format!(r#"data-{}-id="{}""#, kind.as_str(), id),
                None => placeholder_attr(kind, &caps[2]),
            }
        })
        .into_owned()
}

/// Item and asset codenames referenced by codename attributes
pub fn referenced_codenames(html: &str) -> Vec<(ReferenceKind, String)> {
    CODENAME_ATTR
        .captures_iter(html)
        .map(|caps| (reference_kind(&caps), caps[2].to_string()))
        .collect()
}
