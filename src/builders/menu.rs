use crate::builders::store::{DividerStore, ItemKind, Position};
use crate::core::host::TreeItem;

/// What a context-menu entry does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuIntent {
    /// Adds a divider under the live item name.
    Add {
        item_name: String,
        item_type: ItemKind,
        position: Position,
    },
    /// Removes the matched record. `item_name` is the name as recorded, which
    /// may differ from the live name by an extension.
    Remove {
        item_name: String,
        item_type: ItemKind,
        position: Position,
    },
    /// Removes every record matching the item, under each recorded name.
    RemoveAll {
        item_names: Vec<String>,
        item_type: ItemKind,
    },
}

/// One divider entry in an item's context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuAction {
    /// Text shown in the menu, such as `Add divider above`.
    pub label: String,
    pub intent: MenuIntent,
}

fn edge_action(store: &DividerStore, item: &TreeItem, position: Position) -> MenuAction {
    match store.find_match(&item.name, item.kind, position) {
        Some(record) => MenuAction {
            label: format!("Remove divider {position}"),
            intent: MenuIntent::Remove {
                item_name: record.item_name.clone(),
                item_type: record.item_type,
                position,
            },
        },
        None => MenuAction {
            label: format!("Add divider {position}"),
            intent: MenuIntent::Add {
                item_name: item.name.clone(),
                item_type: item.kind,
                position,
            },
        },
    }
}

/// Builds the divider entries for an item's context menu.
///
/// There is always one add-or-remove entry per edge. A remove-all entry is
/// appended only when at least one record matches the item.
pub fn context_menu(store: &DividerStore, item: &TreeItem) -> Vec<MenuAction> {
    let mut actions = vec![
        edge_action(store, item, Position::Above),
        edge_action(store, item, Position::Below),
    ];

    let mut names: Vec<String> = Vec::new();
    for (_, record) in store.matching(&item.name, item.kind) {
        if !names.contains(&record.item_name) {
            names.push(record.item_name.clone());
        }
    }
    if !names.is_empty() {
        actions.push(MenuAction {
            label: "Remove all dividers".to_string(),
            intent: MenuIntent::RemoveAll {
                item_names: names,
                item_type: item.kind,
            },
        });
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_item_offers_two_adds() {
        let store = DividerStore::new();
        let item = TreeItem::from_path("Animals", ItemKind::Folder);
        let labels: Vec<String> = context_menu(&store, &item)
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert_eq!(labels, vec!["Add divider above", "Add divider below"]);
    }

    #[test]
    fn test_matched_item_offers_remove_and_remove_all() {
        let mut store = DividerStore::new();
        store.add("todo", ItemKind::File, Position::Below);
        let item = TreeItem::from_path("notes/todo.md", ItemKind::File);

        let actions = context_menu(&store, &item);
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].label, "Add divider above");
        assert_eq!(
            actions[1].intent,
            MenuIntent::Remove {
                item_name: "todo".to_string(),
                item_type: ItemKind::File,
                position: Position::Below,
            }
        );
        assert_eq!(
            actions[2].intent,
            MenuIntent::RemoveAll {
                item_names: vec!["todo".to_string()],
                item_type: ItemKind::File,
            }
        );
    }
}
