//! Named divider annotations for items of a file/folder tree.
//!
//! Dividers are stored as `(item name, item kind, position)` records, matched
//! against the live tree on every refresh and turned into presentation rules
//! for the host to render.
pub mod builders;
pub mod core;
pub mod utils;
