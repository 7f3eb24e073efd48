use std::collections::BTreeMap;

use crate::builders::store::{DividerStore, ItemKind, Position};
use crate::core::host::TreeItem;

/// Distance between the item edge and the divider, before the thickness is added.
pub const BASE_OFFSET: u8 = 8;
/// Margin added on the divider's side so it does not overlap the item content.
pub const EDGE_MARGIN: u8 = 16;
/// Id of the style block the engine inserts into the host.
pub const STYLE_ID: &str = "tree-dividers";
/// Structural marker placed on every tagged item.
pub const MARKER_CLASS: &str = "has-divider";

/// Color and thickness shared by every divider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    /// A `#rgb` or `#rrggbb` hex color.
    pub color: String,
    /// Line thickness in pixels.
    pub thickness: u8,
}

/// A derived presentation directive for one divider record.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRule {
    /// Tag placed on live items this rule applies to.
    pub tag: String,
    pub kind: ItemKind,
    pub position: Position,
    pub color: String,
    pub thickness: u8,
}

impl RenderRule {
    /// Signed offset from the item edge; negative pushes the segment outward.
    pub fn offset(&self) -> i32 {
        -(i32::from(BASE_OFFSET) + i32::from(self.thickness))
    }

    pub fn margin(&self) -> u8 {
        EDGE_MARGIN
    }

    pub fn radius(&self) -> f64 {
        f64::from(self.thickness) / 2.0
    }

    /// Renders the rule as CSS scoped to the rule's tag.
    pub fn to_css(&self) -> String {
        let title = match self.kind {
            ItemKind::Folder => ".nav-folder-title",
            ItemKind::File => ".nav-file-title",
        };
        let (pseudo, edge) = match self.position {
            Position::Above => ("before", "top"),
            Position::Below => ("after", "bottom"),
        };
        let selector = format!("{title}.{MARKER_CLASS}[data-divider~=\"{}\"]", self.tag);

        let mut css = format!(
            "{selector} {{ position: relative; margin-{edge}: {}px; }}\n",
            self.margin()
        );
        css.push_str(&format!(
            "{selector}::{pseudo} {{ content: \"\"; position: absolute; left: 0; right: 0; \
             {edge}: {}px; height: {}px; background-color: {}; border-radius: {}px; }}\n",
            self.offset(),
            self.thickness,
            self.color,
            self.radius()
        ));
        css
    }
}

/// Everything one apply cycle emits: the rules, and the tags per live item.
///
/// The map is rebuilt from scratch on every cycle and never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    pub rules: Vec<RenderRule>,
    /// Item path → tags of the rules that apply to it, in store order.
    pub tags: BTreeMap<String, Vec<String>>,
}

impl RenderState {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.tags.is_empty()
    }

    /// The combined stylesheet for all rules.
    pub fn stylesheet(&self) -> String {
        self.rules.iter().map(RenderRule::to_css).collect()
    }
}

pub fn tag_for(index: usize) -> String {
    format!("divider-{index}")
}

/// Builds the render state for the given records and live items.
///
/// Every record yields one rule whether or not any live item matches it.
/// Items matching several records collect all of their tags.
pub fn generate(store: &DividerStore, appearance: &Appearance, items: &[TreeItem]) -> RenderState {
    if store.is_empty() {
        return RenderState::default();
    }

    let rules = store
        .iter()
        .enumerate()
        .map(|(index, record)| RenderRule {
            tag: tag_for(index),
            kind: record.item_type,
            position: record.position,
            color: appearance.color.clone(),
            thickness: appearance.thickness,
        })
        .collect();

    let mut tags = BTreeMap::new();
    for item in items {
        let item_tags: Vec<String> = store
            .matching(&item.name, item.kind)
            .map(|(index, _)| tag_for(index))
            .collect();
        if !item_tags.is_empty() {
            tags.insert(item.path.clone(), item_tags);
        }
    }

    RenderState { rules, tags }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appearance(color: &str, thickness: u8) -> Appearance {
        Appearance {
            color: color.to_string(),
            thickness,
        }
    }

    #[test]
    fn test_above_rule_geometry() {
        let mut store = DividerStore::new();
        store.add("Science", ItemKind::Folder, Position::Above);
        let items = vec![TreeItem::from_path("Science", ItemKind::Folder)];

        let state = generate(&store, &appearance("#ff0000", 3), &items);
        let rule = &state.rules[0];
        assert_eq!(rule.thickness, 3);
        assert_eq!(rule.color, "#ff0000");
        assert_eq!(rule.offset(), -11);
        assert_eq!(rule.margin(), 16);

        let css = rule.to_css();
        assert!(css.contains("margin-top: 16px"));
        assert!(css.contains("top: -11px"));
        assert!(css.contains("height: 3px"));
        assert!(css.contains("border-radius: 1.5px"));
        assert!(css.contains("::before"));
        assert_eq!(css.lines().count(), 2);
        assert!(css.ends_with("border-radius: 1.5px; }\n"));
        assert_eq!(state.tags["Science"], vec!["divider-0".to_string()]);
    }

    #[test]
    fn test_below_rule_uses_bottom_edge() {
        let mut store = DividerStore::new();
        store.add("todo.md", ItemKind::File, Position::Below);
        let state = generate(&store, &appearance("#333333", 1), &[]);
        let css = state.stylesheet();
        assert!(css.contains(".nav-file-title"));
        assert!(css.contains("::after"));
        assert!(css.contains("bottom: -9px"));
        assert!(css.contains("margin-bottom: 16px"));
        assert!(state.tags.is_empty());
    }

    #[test]
    fn test_above_and_below_are_additive() {
        let mut store = DividerStore::new();
        store.add("Animals", ItemKind::Folder, Position::Above);
        store.add("Animals", ItemKind::Folder, Position::Below);
        let items = vec![
            TreeItem::from_path("Animals", ItemKind::Folder),
            TreeItem::from_path("Animals2", ItemKind::Folder),
        ];
        let state = generate(&store, &appearance("#555555", 2), &items);
        assert_eq!(state.rules.len(), 2);
        assert_eq!(state.tags.len(), 1);
        assert_eq!(state.tags["Animals"], vec!["divider-0", "divider-1"]);
    }

    #[test]
    fn test_empty_store_emits_nothing() {
        let items = vec![TreeItem::from_path("Animals", ItemKind::Folder)];
        let state = generate(&DividerStore::new(), &appearance("#555555", 2), &items);
        assert!(state.is_empty());
        assert!(state.stylesheet().is_empty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut store = DividerStore::new();
        store.add("todo", ItemKind::File, Position::Above);
        let items = vec![
            TreeItem::from_path("a/todo.md", ItemKind::File),
            TreeItem::from_path("b/todo.txt", ItemKind::File),
        ];
        let look = appearance("#555555", 2);
        assert_eq!(generate(&store, &look, &items), generate(&store, &look, &items));
    }
}
