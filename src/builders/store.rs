use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of tree item a divider is attached to.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A file entry. File names are matched with or without their extension.
    File,
    /// A folder entry. Folder names are matched exactly.
    Folder,
}

/// Which edge of the item the separator occupies.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Above,
    Below,
}

/// Visual treatment of a divider. Only `Line` is produced by user actions.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DividerStyle {
    #[default]
    Line,
    Space,
    Gradient,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::File => write!(f, "file"),
            ItemKind::Folder => write!(f, "folder"),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Above => write!(f, "above"),
            Position::Below => write!(f, "below"),
        }
    }
}

impl fmt::Display for DividerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DividerStyle::Line => write!(f, "line"),
            DividerStyle::Space => write!(f, "space"),
            DividerStyle::Gradient => write!(f, "gradient"),
        }
    }
}

impl FromStr for ItemKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(ItemKind::File),
            "folder" => Ok(ItemKind::Folder),
            _ => anyhow::bail!("Invalid item type: {}", s),
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "above" => Ok(Position::Above),
            "below" => Ok(Position::Below),
            _ => anyhow::bail!("Invalid divider position: {}", s),
        }
    }
}

impl FromStr for DividerStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "line" => Ok(DividerStyle::Line),
            "space" => Ok(DividerStyle::Space),
            "gradient" => Ok(DividerStyle::Gradient),
            _ => anyhow::bail!("Invalid divider style: {}", s),
        }
    }
}

/// A recorded intent to render a separator next to a named tree item.
///
/// The `(item_name, item_type, position)` triple identifies a record; the
/// store never holds two records with the same triple.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DividerRecord {
    /// Display name of the target item. Files keep the extension they were
    /// recorded with.
    pub item_name: String,
    pub item_type: ItemKind,
    pub position: Position,
    #[serde(default)]
    pub style: DividerStyle,
}

impl DividerRecord {
    /// Creates a new `Line` record for the given triple.
    pub fn new(item_name: impl Into<String>, item_type: ItemKind, position: Position) -> Self {
        Self {
            item_name: item_name.into(),
            item_type,
            position,
            style: DividerStyle::Line,
        }
    }

    /// Returns `true` if this record is identified by the given triple.
    pub fn is(&self, item_name: &str, item_type: ItemKind, position: Position) -> bool {
        self.item_name == item_name && self.item_type == item_type && self.position == position
    }
}

/// Result of [`DividerStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// The ordered collection of divider records.
///
/// Insertion order is kept for display grouping only; it has no effect on
/// matching. The store itself is side-effect free: persisting and re-applying
/// after a mutation is the engine's job.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct DividerStore {
    records: Vec<DividerRecord>,
}

impl DividerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `Line` record unless the triple is already present.
    pub fn add(&mut self, item_name: &str, item_type: ItemKind, position: Position) -> AddOutcome {
        if self.query(item_name, item_type, position) {
            return AddOutcome::AlreadyExists;
        }
        self.records.push(DividerRecord::new(item_name, item_type, position));
        AddOutcome::Added
    }

    /// Inserts a full record (keeping its style), with the same deduplication as `add`.
    pub fn insert(&mut self, record: DividerRecord) -> AddOutcome {
        if self.query(&record.item_name, record.item_type, record.position) {
            return AddOutcome::AlreadyExists;
        }
        self.records.push(record);
        AddOutcome::Added
    }

    /// Removes the record identified by the triple. Returns 0 or 1.
    pub fn remove_one(&mut self, item_name: &str, item_type: ItemKind, position: Position) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.is(item_name, item_type, position));
        before - self.records.len()
    }

    /// Removes every record for the item regardless of position.
    pub fn remove_all(&mut self, item_name: &str, item_type: ItemKind) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !(r.item_name == item_name && r.item_type == item_type));
        before - self.records.len()
    }

    /// Empties the store and returns how many records it held.
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    pub fn query(&self, item_name: &str, item_type: ItemKind, position: Position) -> bool {
        self.records.iter().any(|r| r.is(item_name, item_type, position))
    }

    /// Drops records whose triple already appeared earlier in the list.
    /// Returns the number of records dropped.
    pub fn dedup(&mut self) -> usize {
        let before = self.records.len();
        let mut kept: Vec<DividerRecord> = Vec::with_capacity(before);
        for record in self.records.drain(..) {
            if !kept.iter().any(|k| k.is(&record.item_name, record.item_type, record.position)) {
                kept.push(record);
            }
        }
        self.records = kept;
        before - self.records.len()
    }

    pub fn records(&self) -> &[DividerRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &DividerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<DividerRecord>> for DividerStore {
    fn from(records: Vec<DividerRecord>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_duplicate_triple() {
        let mut store = DividerStore::new();
        assert_eq!(
            store.add("Animals", ItemKind::Folder, Position::Below),
            AddOutcome::Added
        );
        assert_eq!(
            store.add("Animals", ItemKind::Folder, Position::Below),
            AddOutcome::AlreadyExists
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].style, DividerStyle::Line);
    }

    #[test]
    fn test_same_name_different_kind_or_position_is_distinct() {
        let mut store = DividerStore::new();
        store.add("notes", ItemKind::Folder, Position::Above);
        store.add("notes", ItemKind::Folder, Position::Below);
        store.add("notes", ItemKind::File, Position::Above);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_one_and_remove_all() {
        let mut store = DividerStore::new();
        store.add("Science", ItemKind::Folder, Position::Above);
        store.add("Science", ItemKind::Folder, Position::Below);
        store.add("todo.md", ItemKind::File, Position::Above);

        assert_eq!(store.remove_one("Science", ItemKind::Folder, Position::Above), 1);
        assert_eq!(store.remove_one("Science", ItemKind::Folder, Position::Above), 0);
        assert!(!store.query("Science", ItemKind::Folder, Position::Above));
        assert!(store.query("Science", ItemKind::Folder, Position::Below));

        store.add("Science", ItemKind::Folder, Position::Above);
        assert_eq!(store.remove_all("Science", ItemKind::Folder), 2);
        assert_eq!(store.remove_all("Science", ItemKind::Folder), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_reports_prior_count() {
        let mut store = DividerStore::new();
        assert_eq!(store.clear(), 0);
        store.add("a", ItemKind::Folder, Position::Above);
        store.add("b", ItemKind::Folder, Position::Above);
        store.add("c", ItemKind::File, Position::Below);
        assert_eq!(store.clear(), 3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut store = DividerStore::from(vec![
            DividerRecord::new("a", ItemKind::Folder, Position::Above),
            DividerRecord::new("b", ItemKind::File, Position::Below),
            DividerRecord::new("a", ItemKind::Folder, Position::Above),
        ]);
        assert_eq!(store.dedup(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[1].item_name, "b");
    }
}
