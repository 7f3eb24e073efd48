use crate::builders::store::{DividerRecord, DividerStore, ItemKind, Position};

/// The `ItemMatcher` trait decides whether a divider applies to a live tree item.
///
/// Matching is stateless: the engine re-runs it over every live item on each
/// apply cycle, so the same inputs always produce the same matched set.
pub trait ItemMatcher {
    /// Checks whether this matcher applies to an item with the given display
    /// name and kind.
    ///
    /// # Arguments
    /// * `name`: The display name of the live item, as the host shows it.
    /// * `kind`: Whether the live item is a file or a folder.
    fn matches_item(&self, name: &str, kind: ItemKind) -> bool;
}

/// Removes the last `.`-delimited suffix of a file name.
///
/// A single pass only: `archive.tar.gz` becomes `archive.tar`. Names without a
/// dot, dot-files such as `.gitignore` and names ending in a bare dot are
/// returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

/// File names match when any of the four name forms line up. The record may
/// have been stored with or without an extension, and the live name may or
/// may not show one.
fn file_names_match(recorded: &str, live: &str) -> bool {
    recorded == live
        || strip_extension(recorded) == strip_extension(live)
        || live == strip_extension(recorded)
        || strip_extension(live) == recorded
}

impl ItemMatcher for DividerRecord {
    fn matches_item(&self, name: &str, kind: ItemKind) -> bool {
        if self.item_type != kind {
            return false;
        }
        match kind {
            // Folder names carry no extension.
            ItemKind::Folder => self.item_name == name,
            ItemKind::File => file_names_match(&self.item_name, name),
        }
    }
}

impl DividerStore {
    /// All records that apply to the live item, in store order.
    pub fn matching<'a>(
        &'a self,
        name: &'a str,
        kind: ItemKind,
    ) -> impl Iterator<Item = (usize, &'a DividerRecord)> + 'a {
        self.iter()
            .enumerate()
            .filter(move |(_, record)| record.matches_item(name, kind))
    }

    /// The first record at `position` that applies to the live item.
    ///
    /// The returned record borrows only the store, never `name`.
    pub fn find_match(
        &self,
        name: &str,
        kind: ItemKind,
        position: Position,
    ) -> Option<&DividerRecord> {
        self.iter().find(|record| record.position == position && record.matches_item(name, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> DividerRecord {
        DividerRecord::new(name, ItemKind::File, Position::Above)
    }

    fn folder(name: &str) -> DividerRecord {
        DividerRecord::new(name, ItemKind::Folder, Position::Below)
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("todo.md"), "todo");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(strip_extension(".gitignore"), ".gitignore");
        assert_eq!(strip_extension("trailing."), "trailing.");
    }

    #[test]
    fn test_file_match_ignores_extension_both_ways() {
        assert!(file("todo.md").matches_item("todo.md", ItemKind::File));
        assert!(file("todo.md").matches_item("todo", ItemKind::File));
        assert!(file("todo").matches_item("todo.md", ItemKind::File));
        assert!(file("todo.md").matches_item("todo.txt", ItemKind::File));
        assert!(!file("todo.md").matches_item("todos.md", ItemKind::File));
    }

    #[test]
    fn test_multi_dot_file_names_strip_once() {
        assert!(file("archive.tar.gz").matches_item("archive.tar", ItemKind::File));
        assert!(file("archive.tar").matches_item("archive.tar.gz", ItemKind::File));
        assert!(!file("archive.tar.gz").matches_item("archive", ItemKind::File));
    }

    #[test]
    fn test_folder_match_is_exact() {
        assert!(folder("Animals").matches_item("Animals", ItemKind::Folder));
        assert!(!folder("Animals").matches_item("Animals2", ItemKind::Folder));
        assert!(!folder("v1.2").matches_item("v1", ItemKind::Folder));
    }

    #[test]
    fn test_kind_must_agree() {
        assert!(!folder("Animals").matches_item("Animals", ItemKind::File));
        assert!(!file("todo").matches_item("todo", ItemKind::Folder));
    }

    #[test]
    fn test_store_matching_reports_indices() {
        let mut store = DividerStore::new();
        store.add("Science", ItemKind::Folder, Position::Above);
        store.add("todo.md", ItemKind::File, Position::Below);
        store.add("todo", ItemKind::File, Position::Above);

        let hits: Vec<usize> = store.matching("todo.md", ItemKind::File).map(|(i, _)| i).collect();
        assert_eq!(hits, vec![1, 2]);
        assert!(store.find_match("todo", ItemKind::File, Position::Below).is_some());
        assert!(store.find_match("Science", ItemKind::Folder, Position::Below).is_none());
    }

    #[test]
    fn test_find_match_outlives_the_live_name() {
        let mut store = DividerStore::new();
        store.add("todo", ItemKind::File, Position::Below);

        let found = {
            let live = String::from("todo.md");
            store.find_match(&live, ItemKind::File, Position::Below)
        };
        assert_eq!(found.map(|r| r.item_name.as_str()), Some("todo"));
    }
}
