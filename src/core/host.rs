use anyhow::Result;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::builders::store::ItemKind;

/// A file or folder entry as displayed in the host's tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeItem {
    /// Identity of the item within the tree (e.g., its vault-relative path).
    pub path: String,
    /// Display name used for matching.
    pub name: String,
    pub kind: ItemKind,
}

impl TreeItem {
    pub fn new(path: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind,
        }
    }

    /// Builds an item whose display name is the last `/` segment of `path`.
    pub fn from_path(path: impl Into<String>, kind: ItemKind) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(path.as_str()).to_string();
        Self { path, name, kind }
    }
}

/// Enumerates the live items of the host tree.
pub trait TreeProvider {
    fn items(&self) -> Result<Vec<TreeItem>>;
}

/// Where presentation state goes: named style blocks plus per-item markers.
pub trait StyleSink {
    fn insert_style(&mut self, id: &str, css: &str) -> Result<()>;
    fn remove_style(&mut self, id: &str) -> Result<()>;
    /// Tags the item at `path`. An item may carry several tags.
    fn add_marker(&mut self, path: &str, tag: &str) -> Result<()>;
    /// Removes every tag from every item.
    fn clear_markers(&mut self) -> Result<()>;
}

/// Fire-and-forget user-visible messages.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// A tree held in memory. Clones share the same item list, so a host can
/// mutate the tree while the engine holds another handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    items: Rc<RefCell<Vec<TreeItem>>>,
}

impl MemoryTree {
    pub fn new(items: Vec<TreeItem>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn push(&self, item: TreeItem) {
        self.items.borrow_mut().push(item);
    }

    /// Renames the item at `path`, keeping its kind. Returns `false` if absent.
    pub fn rename(&self, path: &str, new_path: &str) -> bool {
        let mut items = self.items.borrow_mut();
        match items.iter_mut().find(|i| i.path == path) {
            Some(item) => {
                *item = TreeItem::from_path(new_path, item.kind);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, path: &str) {
        self.items.borrow_mut().retain(|i| i.path != path);
    }
}

impl TreeProvider for MemoryTree {
    fn items(&self) -> Result<Vec<TreeItem>> {
        Ok(self.items.borrow().clone())
    }
}

/// Snapshot of everything a [`MemoryStyleSink`] currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSnapshot {
    pub styles: BTreeMap<String, String>,
    pub markers: BTreeMap<String, BTreeSet<String>>,
}

impl StyleSnapshot {
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.markers.is_empty()
    }
}

/// Records style blocks and markers in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStyleSink {
    state: Rc<RefCell<StyleSnapshot>>,
}

impl MemoryStyleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StyleSnapshot {
        self.state.borrow().clone()
    }
}

impl StyleSink for MemoryStyleSink {
    fn insert_style(&mut self, id: &str, css: &str) -> Result<()> {
        self.state
            .borrow_mut()
            .styles
            .insert(id.to_string(), css.to_string());
        Ok(())
    }

    fn remove_style(&mut self, id: &str) -> Result<()> {
        self.state.borrow_mut().styles.remove(id);
        Ok(())
    }

    fn add_marker(&mut self, path: &str, tag: &str) -> Result<()> {
        self.state
            .borrow_mut()
            .markers
            .entry(path.to_string())
            .or_default()
            .insert(tag.to_string());
        Ok(())
    }

    fn clear_markers(&mut self) -> Result<()> {
        self.state.borrow_mut().markers.clear();
        Ok(())
    }
}

/// Collects notifications in memory. Clones share the message list.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    messages: Rc<RefCell<Vec<String>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Prints notifications to standard output.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("✓ {message}");
    }
}
