use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::builders::store::ItemKind;
use crate::core::host::{TreeItem, TreeProvider};

/// A tree backed by a directory on disk.
///
/// Every file and folder below the root becomes an item; the root itself does
/// not. Hidden entries (names starting with `.`) are skipped together with
/// everything under them.
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl TreeProvider for FsTree {
    fn items(&self) -> Result<Vec<TreeItem>> {
        let mut items = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry.context("Failed to read tree entry")?;
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .context("Tree entry outside root")?;
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let kind = if entry.file_type().is_dir() {
                ItemKind::Folder
            } else {
                ItemKind::File
            };
            items.push(TreeItem::from_path(path, kind));
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lists_files_and_folders_without_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Animals/Cats")).unwrap();
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join("Animals/todo.md"), "").unwrap();
        fs::write(dir.path().join(".obsidian/app.json"), "{}").unwrap();
        fs::write(dir.path().join(".tree-dividers.toml"), "").unwrap();

        let items = FsTree::new(dir.path()).items().unwrap();
        let paths: Vec<(&str, ItemKind)> = items.iter().map(|i| (i.path.as_str(), i.kind)).collect();
        assert_eq!(
            paths,
            vec![
                ("Animals", ItemKind::Folder),
                ("Animals/Cats", ItemKind::Folder),
                ("Animals/todo.md", ItemKind::File),
            ]
        );
        assert_eq!(items[2].name, "todo.md");
    }
}
