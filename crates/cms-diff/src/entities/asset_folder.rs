use cms_model::AssetFolder;

use crate::adjust::adjust;
use crate::handler::{Constant, Leaf, ObjectDiff};
use crate::handlers::KeyedArray;
use crate::operation::PatchOperation;

/// Asset folders are patched as one tree, so the result is a single
/// adjusted operation list whose paths encode tree position.
pub fn diff_asset_folders(source: &[AssetFolder], target: &[AssetFolder]) -> Vec<PatchOperation> {
    adjust(KeyedArray::new(diff_folder).diff_members(source, target))
}

fn diff_folder(source: &AssetFolder, target: &AssetFolder) -> Vec<PatchOperation> {
    ObjectDiff::new(source, target)
        .field("name", |f| &f.name, Leaf)
        .field("codename", |f| &f.codename, Constant)
        .field("external_id", |f| &f.external_id, Constant)
        .field("folders", |f| &f.folders, KeyedArray::new(diff_folder))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn folder(codename: &str, name: &str, folders: Vec<AssetFolder>) -> AssetFolder {
        AssetFolder {
            name: name.into(),
            codename: codename.into(),
            external_id: None,
            folders,
        }
    }

    #[test]
    fn tree_changes_form_one_adjusted_list() {
        let source = vec![
            folder("images", "Pictures", vec![folder("banners", "Banners", vec![])]),
            folder("docs", "Docs", vec![]),
        ];
        let target = vec![
            folder("images", "Images", vec![folder("icons", "Icons", vec![])]),
            folder("legacy", "Legacy", vec![]),
        ];

        let summary: Vec<String> = diff_asset_folders(&source, &target)
            .iter()
            .map(|op| format!("{} {}", op.kind(), op.path()))
            .collect();

        assert_eq!(
            summary,
            vec![
                "addInto /codename:images/folders",
                "addInto ",
                "replace /codename:images/name",
                "remove /codename:images/folders/codename:icons",
                "remove /codename:legacy",
            ]
        );
    }

    #[test]
    fn identical_trees_have_no_operations() {
        let tree = vec![folder("images", "Images", vec![folder("icons", "Icons", vec![])])];
        assert!(diff_asset_folders(&tree, &tree).is_empty());
    }
}
