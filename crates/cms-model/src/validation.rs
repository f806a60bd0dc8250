//! Schema and semantic validation of snapshot documents
//!
//! Every check reports into a shared issue list instead of failing fast, so
//! a broken snapshot folder is described in full in a single run.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::element::{Element, ElementData, ElementKind};
use crate::entity::{AssetFolder, TaxonomyTerm};
use crate::error::ValidationIssue;
use crate::kind::EntityKind;
use crate::model::SyncModel;

static CODENAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Check a single snapshot document against the shape of its entity kind
pub fn validate_document(kind: EntityKind, document: &Value) -> Vec<ValidationIssue> {
    let file = kind.file_name();
    let mut checker = Checker::new(&file);

    if kind == EntityKind::WebSpotlight {
        checker.web_spotlight(document, "");
        return checker.issues;
    }

    let Some(entities) = document.as_array() else {
        checker.issue("", "expected an array of entities");
        return checker.issues;
    };

    for (i, entity) in entities.iter().enumerate() {
        let path = format!("/{}", i);
        let Some(obj) = checker.object(entity, &path) else {
            continue;
        };
        checker.named(obj, &path);
        match kind {
            EntityKind::ContentTypes => {
                for (j, group) in checker.array(obj, &path, "content_groups").iter().enumerate() {
                    let group_path = format!("{}/content_groups/{}", path, j);
                    if let Some(group) = checker.object(group, &group_path) {
                        checker.named(group, &group_path);
                    }
                }
                checker.elements(obj, &path);
            }
            EntityKind::ContentTypeSnippets => checker.elements(obj, &path),
            EntityKind::Taxonomies => checker.tree(obj, &path, "terms"),
            EntityKind::AssetFolders => checker.tree(obj, &path, "folders"),
            EntityKind::Languages => {
                checker.optional_bool(obj, &path, "is_active");
                checker.optional_bool(obj, &path, "is_default");
                checker.optional_reference(obj, &path, "fallback_language");
            }
            EntityKind::Spaces => {
                for (j, collection) in checker.array(obj, &path, "collections").iter().enumerate() {
                    checker.reference(collection, &format!("{}/collections/{}", path, j));
                }
                if let Some(root) = obj.get("web_spotlight_root_item").filter(|v| !v.is_null()) {
                    checker.content_reference(root, &format!("{}/web_spotlight_root_item", path));
                }
            }
            EntityKind::Collections | EntityKind::WebSpotlight => {}
        }
    }

    checker.issues
}

/// Cross-entity checks on a model whose documents are well formed
pub fn validate_model(model: &SyncModel) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let types_file = EntityKind::ContentTypes.file_name();
    let snippets_file = EntityKind::ContentTypeSnippets.file_name();

    // Types and snippets share one codename namespace on the service
    let mut type_codenames = HashSet::new();
    for (i, ty) in model.content_types.iter().enumerate() {
        let path = format!("/{}", i);
        check_codename(&mut issues, &types_file, &path, &ty.codename);
        if !type_codenames.insert(ty.codename.as_str()) {
            issues.push(duplicate(&types_file, &path, &ty.codename));
        }
        check_unique(&mut issues, &types_file, &format!("{}/content_groups", path), ty.content_groups.iter().map(|g| g.codename.as_str()));

        let groups: HashSet<&str> = ty.content_groups.iter().map(|g| g.codename.as_str()).collect();
        for (j, element) in ty.elements.iter().enumerate() {
            let element_path = format!("{}/elements/{}", path, j);
            match &element.content_group {
                Some(group) if !groups.contains(group.codename.as_str()) => issues.push(ValidationIssue::new(
                    &types_file,
                    format!("{}/content_group", element_path),
                    format!("unknown content group `{}`", group.codename),
                )),
                None if !groups.is_empty() => issues.push(ValidationIssue::new(
                    &types_file,
                    &element_path,
                    "element must belong to a content group when the type has groups",
                )),
                _ => {}
            }
        }
        check_elements(&mut issues, &types_file, &path, &ty.elements);
    }
    for (i, snippet) in model.content_type_snippets.iter().enumerate() {
        let path = format!("/{}", i);
        check_codename(&mut issues, &snippets_file, &path, &snippet.codename);
        if !type_codenames.insert(snippet.codename.as_str()) {
            issues.push(duplicate(&snippets_file, &path, &snippet.codename));
        }
        for (j, element) in snippet.elements.iter().enumerate() {
            if element.kind() == ElementKind::Snippet {
                issues.push(ValidationIssue::new(
                    &snippets_file,
                    format!("{}/elements/{}", path, j),
                    "snippets cannot contain snippet elements",
                ));
            }
        }
        check_elements(&mut issues, &snippets_file, &path, &snippet.elements);
    }

    let taxonomies_file = EntityKind::Taxonomies.file_name();
    check_unique(&mut issues, &taxonomies_file, "", model.taxonomies.iter().map(|t| t.codename.as_str()));
    for (i, group) in model.taxonomies.iter().enumerate() {
        check_codename(&mut issues, &taxonomies_file, &format!("/{}", i), &group.codename);
        check_terms(&mut issues, &taxonomies_file, &format!("/{}/terms", i), &group.terms);
    }

    let folders_file = EntityKind::AssetFolders.file_name();
    check_folders(&mut issues, &folders_file, "", &model.asset_folders);

    for (kind, codenames) in [
        (EntityKind::Collections, model.collections.iter().map(|c| c.codename.as_str()).collect::<Vec<_>>()),
        (EntityKind::Spaces, model.spaces.iter().map(|s| s.codename.as_str()).collect()),
        (EntityKind::Languages, model.languages.iter().map(|l| l.codename.as_str()).collect()),
    ] {
        let file = kind.file_name();
        for (i, codename) in codenames.iter().enumerate() {
            check_codename(&mut issues, &file, &format!("/{}", i), codename);
        }
        check_unique(&mut issues, &file, "", codenames.into_iter());
    }

    let default_languages = model.languages.iter().filter(|l| l.is_default).count();
    if default_languages > 1 {
        issues.push(ValidationIssue::new(
            EntityKind::Languages.file_name(),
            "",
            format!("expected at most one default language, found {}", default_languages),
        ));
    }

    if model.web_spotlight.enabled && model.web_spotlight.root_type.is_none() {
        issues.push(ValidationIssue::new(
            EntityKind::WebSpotlight.file_name(),
            "/root_type",
            "an enabled web spotlight needs a root type",
        ));
    }

    issues
}

fn duplicate(file: &str, path: &str, codename: &str) -> ValidationIssue {
    ValidationIssue::new(file, path, format!("duplicate codename `{}`", codename))
}

fn check_codename(issues: &mut Vec<ValidationIssue>, file: &str, path: &str, codename: &str) {
    if !CODENAME.is_match(codename) {
        issues.push(ValidationIssue::new(
            file,
            format!("{}/codename", path),
            format!("invalid codename `{}`", codename),
        ));
    }
}

fn check_unique<'a>(
    issues: &mut Vec<ValidationIssue>,
    file: &str,
    path: &str,
    codenames: impl Iterator<Item = &'a str>,
) {
    let mut seen = HashSet::new();
    for (i, codename) in codenames.enumerate() {
        if !seen.insert(codename) {
            issues.push(duplicate(file, &format!("{}/{}", path, i), codename));
        }
    }
}

fn check_elements(issues: &mut Vec<ValidationIssue>, file: &str, path: &str, elements: &[Element]) {
    let elements_path = format!("{}/elements", path);
    check_unique(issues, file, &elements_path, elements.iter().map(|e| e.codename.as_str()));

    for (i, element) in elements.iter().enumerate() {
        let element_path = format!("{}/{}", elements_path, i);
        check_codename(issues, file, &element_path, &element.codename);

        if let ElementData::MultipleChoice(choice) = &element.data {
            let options: HashSet<&str> = choice.options.iter().map(|o| o.codename.as_str()).collect();
            check_unique(
                issues,
                file,
                &format!("{}/options", element_path),
                choice.options.iter().map(|o| o.codename.as_str()),
            );
            for selected in choice.default.iter().flat_map(|d| &d.global.value) {
                if !options.contains(selected.codename.as_str()) {
                    issues.push(ValidationIssue::new(
                        file,
                        format!("{}/default", element_path),
                        format!("default references unknown option `{}`", selected.codename),
                    ));
                }
            }
        }
    }
}

fn check_terms(issues: &mut Vec<ValidationIssue>, file: &str, path: &str, terms: &[TaxonomyTerm]) {
    check_unique(issues, file, path, terms.iter().map(|t| t.codename.as_str()));
    for (i, term) in terms.iter().enumerate() {
        let term_path = format!("{}/{}", path, i);
        check_codename(issues, file, &term_path, &term.codename);
        check_terms(issues, file, &format!("{}/terms", term_path), &term.terms);
    }
}

fn check_folders(issues: &mut Vec<ValidationIssue>, file: &str, path: &str, folders: &[AssetFolder]) {
    check_unique(issues, file, path, folders.iter().map(|f| f.codename.as_str()));
    for (i, folder) in folders.iter().enumerate() {
        let folder_path = format!("{}/{}", path, i);
        check_codename(issues, file, &folder_path, &folder.codename);
        check_folders(issues, file, &format!("{}/folders", folder_path), &folder.folders);
    }
}

struct Checker<'a> {
    file: &'a str,
    issues: Vec<ValidationIssue>,
}

impl<'a> Checker<'a> {
    fn new(file: &'a str) -> Self {
        Self {
            file,
            issues: Vec::new(),
        }
    }

    fn issue(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(self.file, path, message));
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.issue(path, "expected an object");
        }
        obj
    }

    fn string(&mut self, obj: &Map<String, Value>, path: &str, field: &str) {
        match obj.get(field) {
            Some(Value::String(_)) => {}
            Some(_) => self.issue(&format!("{}/{}", path, field), "expected a string"),
            None => self.issue(path, format!("missing required field `{}`", field)),
        }
    }

    fn optional_string(&mut self, obj: &Map<String, Value>, path: &str, field: &str) {
        if let Some(value) = obj.get(field) {
            if !value.is_string() && !value.is_null() {
                self.issue(&format!("{}/{}", path, field), "expected a string");
            }
        }
    }

    fn optional_bool(&mut self, obj: &Map<String, Value>, path: &str, field: &str) {
        if let Some(value) = obj.get(field) {
            if !value.is_boolean() {
                self.issue(&format!("{}/{}", path, field), "expected a boolean");
            }
        }
    }

    /// Name, codename and optional external id
    fn named(&mut self, obj: &Map<String, Value>, path: &str) {
        self.string(obj, path, "name");
        self.string(obj, path, "codename");
        self.optional_string(obj, path, "external_id");
    }

    fn array<'v>(&mut self, obj: &'v Map<String, Value>, path: &str, field: &str) -> &'v [Value] {
        match obj.get(field) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.issue(&format!("{}/{}", path, field), "expected an array");
                &[]
            }
            None => &[],
        }
    }

    /// A `{codename}` reference
    fn reference(&mut self, value: &Value, path: &str) {
        if let Some(obj) = self.object(value, path) {
            if obj.contains_key("id") && !obj.contains_key("codename") {
                self.issue(path, "reference by internal id; expected a codename");
            } else {
                self.string(obj, path, "codename");
            }
        }
    }

    fn optional_reference(&mut self, obj: &Map<String, Value>, path: &str, field: &str) {
        if let Some(value) = obj.get(field).filter(|v| !v.is_null()) {
            self.reference(value, &format!("{}/{}", path, field));
        }
    }

    /// A `{codename}` or `{external_id}` reference to an item or asset
    fn content_reference(&mut self, value: &Value, path: &str) {
        if let Some(obj) = self.object(value, path) {
            let by_codename = obj.get("codename").is_some_and(Value::is_string);
            let by_external_id = obj.get("external_id").is_some_and(Value::is_string);
            if !by_codename && !by_external_id {
                self.issue(path, "expected a codename or external_id reference");
            }
        }
    }

    fn tree(&mut self, obj: &Map<String, Value>, path: &str, children: &str) {
        for (i, child) in self.array(obj, path, children).iter().enumerate() {
            let child_path = format!("{}/{}/{}", path, children, i);
            if let Some(child) = self.object(child, &child_path) {
                self.named(child, &child_path);
                self.tree(child, &child_path, children);
            }
        }
    }

    fn elements(&mut self, obj: &Map<String, Value>, path: &str) {
        for (i, element) in self.array(obj, path, "elements").iter().enumerate() {
            let element_path = format!("{}/elements/{}", path, i);
            if let Some(element) = self.object(element, &element_path) {
                self.element(element, &element_path);
            }
        }
    }

    fn element(&mut self, obj: &Map<String, Value>, path: &str) {
        self.string(obj, path, "codename");
        self.optional_string(obj, path, "external_id");
        self.optional_reference(obj, path, "content_group");

        let Some(tag) = obj.get("type").and_then(Value::as_str) else {
            self.issue(path, "missing element `type`");
            return;
        };
        let Some(kind) = ElementKind::from_tag(tag) else {
            self.issue(&format!("{}/type", path), format!("unknown element type `{}`", tag));
            return;
        };

        if !matches!(kind, ElementKind::Guidelines | ElementKind::Snippet) {
            self.string(obj, path, "name");
            self.optional_string(obj, path, "guidelines");
            self.optional_bool(obj, path, "is_required");
            self.optional_bool(obj, path, "is_non_localizable");
        }

        match kind {
            ElementKind::Guidelines => self.string(obj, path, "guidelines"),
            ElementKind::Snippet => match obj.get("snippet") {
                Some(snippet) => self.reference(snippet, &format!("{}/snippet", path)),
                None => self.issue(path, "missing required field `snippet`"),
            },
            ElementKind::Taxonomy => match obj.get("taxonomy_group") {
                Some(group) => self.reference(group, &format!("{}/taxonomy_group", path)),
                None => self.issue(path, "missing required field `taxonomy_group`"),
            },
            ElementKind::MultipleChoice => {
                self.string(obj, path, "mode");
                for (i, option) in self.array(obj, path, "options").iter().enumerate() {
                    let option_path = format!("{}/options/{}", path, i);
                    if let Some(option) = self.object(option, &option_path) {
                        self.named(option, &option_path);
                    }
                }
            }
            ElementKind::UrlSlug => match obj.get("depends_on").and_then(Value::as_object) {
                Some(depends_on) => {
                    let dep_path = format!("{}/depends_on", path);
                    match depends_on.get("element") {
                        Some(element) => self.reference(element, &format!("{}/element", dep_path)),
                        None => self.issue(&dep_path, "missing required field `element`"),
                    }
                    self.optional_reference(depends_on, &dep_path, "snippet");
                }
                None => self.issue(path, "missing required field `depends_on`"),
            },
            ElementKind::Custom => self.string(obj, path, "source_url"),
            ElementKind::RichText => {
                for field in ["allowed_content_types", "allowed_item_link_types"] {
                    for (i, r) in self.array(obj, path, field).iter().enumerate() {
                        self.reference(r, &format!("{}/{}/{}", path, field, i));
                    }
                }
            }
            ElementKind::LinkedItems | ElementKind::Subpages | ElementKind::Asset => {
                for (i, r) in self.array(obj, path, "allowed_content_types").iter().enumerate() {
                    self.reference(r, &format!("{}/allowed_content_types/{}", path, i));
                }
                let defaults = obj
                    .get("default")
                    .and_then(|d| d.pointer("/global/value"))
                    .and_then(Value::as_array);
                for (i, r) in defaults.into_iter().flatten().enumerate() {
                    self.content_reference(r, &format!("{}/default/global/value/{}", path, i));
                }
            }
            ElementKind::Text | ElementKind::Number | ElementKind::DateTime => {}
        }
    }

    fn web_spotlight(&mut self, document: &Value, path: &str) {
        let Some(obj) = self.object(document, path) else {
            return;
        };
        match obj.get("enabled") {
            Some(Value::Bool(_)) => {}
            Some(_) => self.issue("/enabled", "expected a boolean"),
            None => self.issue(path, "missing required field `enabled`"),
        }
        self.optional_reference(obj, path, "root_type");
    }
}
