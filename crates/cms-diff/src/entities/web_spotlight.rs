use cms_model::WebSpotlight;
use serde::{Deserialize, Serialize};

/// Change to the Web Spotlight singleton
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum WebSpotlightChange {
    #[default]
    None,
    Activate {
        #[serde(rename = "rootTypeCodename")]
        root_type_codename: String,
    },
    Deactivate,
    ChangeRootType {
        #[serde(rename = "rootTypeCodename")]
        root_type_codename: String,
    },
}

impl WebSpotlightChange {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

pub fn diff_web_spotlight(source: &WebSpotlight, target: &WebSpotlight) -> WebSpotlightChange {
    let root = source.root_type.as_ref().map(|r| r.codename.clone());
    match (source.enabled, target.enabled) {
        (true, false) => match root {
            Some(root_type_codename) => WebSpotlightChange::Activate { root_type_codename },
            None => {
                tracing::warn!("Web Spotlight is enabled in the source without a root type; skipping activation");
                WebSpotlightChange::None
            }
        },
        (false, true) => WebSpotlightChange::Deactivate,
        (true, true) if source.root_type != target.root_type => match root {
            Some(root_type_codename) => WebSpotlightChange::ChangeRootType { root_type_codename },
            None => WebSpotlightChange::None,
        },
        _ => WebSpotlightChange::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_model::CodenameRef;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn spotlight(enabled: bool, root: Option<&str>) -> WebSpotlight {
        WebSpotlight {
            enabled,
            root_type: root.map(CodenameRef::new),
        }
    }

    #[rstest]
    #[case(spotlight(true, Some("article")), spotlight(false, None), json!({"change": "activate", "rootTypeCodename": "article"}))]
    #[case(spotlight(false, None), spotlight(true, Some("article")), json!({"change": "deactivate"}))]
    #[case(spotlight(true, Some("page")), spotlight(true, Some("article")), json!({"change": "changeRootType", "rootTypeCodename": "page"}))]
    #[case(spotlight(true, Some("page")), spotlight(true, Some("page")), json!({"change": "none"}))]
    #[case(spotlight(false, Some("page")), spotlight(false, None), json!({"change": "none"}))]
    #[case(spotlight(true, None), spotlight(false, None), json!({"change": "none"}))]
    fn change_marker(#[case] source: WebSpotlight, #[case] target: WebSpotlight, #[case] expected: serde_json::Value) {
        let change = diff_web_spotlight(&source, &target);
        assert_eq!(serde_json::to_value(&change).unwrap(), expected);
    }
}
