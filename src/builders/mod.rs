// This file declares the `builders` modules: the pieces the engine combines
// to turn stored divider records into rendered output.

// `store` module:
// The divider data model (`DividerRecord`, `ItemKind`, `Position`) and the
// deduplicating `DividerStore`.
pub mod store;

// `matcher` module:
// The `ItemMatcher` trait and the name matching rules: exact for folders,
// extension-insensitive for files.
pub mod matcher;

// `rules` module:
// Turns records plus appearance settings into render rules, CSS text and the
// per-item tag map.
pub mod rules;

// `menu` module:
// Builds the add/remove entries contributed to an item's context menu.
pub mod menu;

// `reporter` module:
// The settings panel model and its console rendering.
pub mod reporter;

// `validator` module:
// Checks settings for bad colors, out-of-range thickness and duplicates.
pub mod validator;

// `importer` module:
// Reads divider lists from exported files and merges them into a store.
pub mod importer;
