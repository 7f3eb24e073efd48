use std::ops::RangeInclusive;

use crate::builders::store::{DividerRecord, ItemKind};
use crate::core::config::{MAX_THICKNESS, MIN_THICKNESS, Settings};

/// The model behind the settings panel.
///
/// Hosts render it with their own widgets; [`ConsoleReporter`] prints it.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsPanel {
    pub enabled: bool,
    pub color: String,
    pub thickness: u8,
    /// Slider bounds, integer step.
    pub thickness_range: RangeInclusive<u8>,
    /// Folder dividers, in insertion order.
    pub folders: Vec<DividerRecord>,
    /// File dividers, in insertion order.
    pub files: Vec<DividerRecord>,
}

impl SettingsPanel {
    pub fn from_settings(settings: &Settings) -> Self {
        let (folders, files): (Vec<DividerRecord>, Vec<DividerRecord>) = settings
            .dividers
            .iter()
            .cloned()
            .partition(|r| r.item_type == ItemKind::Folder);

        Self {
            enabled: settings.enabled,
            color: settings.divider_color.clone(),
            thickness: settings.divider_thickness,
            thickness_range: MIN_THICKNESS..=MAX_THICKNESS,
            folders,
            files,
        }
    }

    pub fn total(&self) -> usize {
        self.folders.len() + self.files.len()
    }
}

/// Renders a [`SettingsPanel`] for a human reader.
pub trait PanelReporter {
    fn render_panel(&self, panel: &SettingsPanel) -> String;
}

/// Plain-text rendering used by the `list` command.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    /// Formats one group of records under a heading.
    fn format_group(&self, heading: &str, records: &[DividerRecord]) -> String {
        let mut out = format!("\n{heading} ({})\n", records.len());
        for record in records {
            out.push_str(&format!(
                "  └─ {} ({} {})\n",
                record.item_name, record.position, record.style
            ));
        }
        out
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelReporter for ConsoleReporter {
    fn render_panel(&self, panel: &SettingsPanel) -> String {
        let mut out = String::new();
        out.push_str("📏 Tree Dividers\n");
        out.push_str("================\n");
        out.push_str(&format!(
            "Enabled: {}\n",
            if panel.enabled { "yes" } else { "no" }
        ));
        out.push_str(&format!("Color: {}\n", panel.color));
        out.push_str(&format!(
            "Thickness: {} ({}-{})\n",
            panel.thickness,
            panel.thickness_range.start(),
            panel.thickness_range.end()
        ));

        if panel.total() == 0 {
            out.push_str("\nNo dividers configured.\n");
            return out;
        }

        if !panel.folders.is_empty() {
            out.push_str(&self.format_group("📁 Folders", &panel.folders));
        }
        if !panel.files.is_empty() {
            out.push_str(&self.format_group("📄 Files", &panel.files));
        }
        out.push_str(&format!("\nTotal dividers: {}\n", panel.total()));
        out
    }
}
