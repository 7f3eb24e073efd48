use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::builders::rules::Appearance;
use crate::builders::store::{DividerRecord, DividerStore, DividerStyle, ItemKind, Position};
use crate::builders::validator::is_valid_color;

pub const DEFAULT_COLOR: &str = "#555555";
pub const DEFAULT_THICKNESS: u8 = 2;
pub const MIN_THICKNESS: u8 = 1;
pub const MAX_THICKNESS: u8 = 5;

/// Name of the settings file created by [`SettingsManager::new_at`].
pub const SETTINGS_FILE: &str = ".tree-dividers.toml";

/// Persisted state of the divider system.
///
/// Missing fields take their value from [`Settings::default`], so documents
/// written by older versions load cleanly.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub divider_color: String,
    pub divider_thickness: u8,
    pub dividers: DividerStore,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            divider_color: DEFAULT_COLOR.to_string(),
            divider_thickness: DEFAULT_THICKNESS,
            dividers: DividerStore::new(),
        }
    }
}

impl Settings {
    pub fn appearance(&self) -> Appearance {
        Appearance {
            color: self.divider_color.clone(),
            thickness: self.divider_thickness,
        }
    }

    /// Repairs values a hand edit or an older version could have left behind.
    ///
    /// # Returns
    /// One message per repaired value; empty if nothing changed.
    pub fn heal(&mut self) -> Vec<String> {
        let mut issues = Vec::new();

        let clamped = self.divider_thickness.clamp(MIN_THICKNESS, MAX_THICKNESS);
        if clamped != self.divider_thickness {
            issues.push(format!(
                "Divider thickness {} is outside {MIN_THICKNESS}-{MAX_THICKNESS}, using {clamped}",
                self.divider_thickness
            ));
            self.divider_thickness = clamped;
        }

        if !is_valid_color(&self.divider_color) {
            issues.push(format!(
                "Invalid divider color '{}', using {DEFAULT_COLOR}",
                self.divider_color
            ));
            self.divider_color = DEFAULT_COLOR.to_string();
        }

        let dropped = self.dividers.dedup();
        if dropped > 0 {
            issues.push(format!("Dropped {dropped} duplicate divider record(s)"));
        }

        issues
    }

    /// Parses a settings document field by field over the defaults.
    ///
    /// A field with the wrong type keeps its default, an out-of-range
    /// thickness is clamped and a divider entry that cannot be read is skipped
    /// on its own, so one bad value never costs the rest of the document.
    ///
    /// # Returns
    /// The healed settings and one message per value that was repaired or
    /// dropped. Only a document that is not TOML at all yields the defaults.
    pub fn parse_toml(content: &str) -> (Self, Vec<String>) {
        let mut settings = Settings::default();
        let mut issues = Vec::new();

        let table: toml::Table = match toml::from_str(content) {
            Ok(table) => table,
            Err(e) => {
                issues.push(format!("Settings are not valid TOML, using defaults: {e}"));
                return (settings, issues);
            }
        };

        if let Some(value) = table.get("enabled") {
            match value.as_bool() {
                Some(enabled) => settings.enabled = enabled,
                None => issues.push(format!("Invalid enabled value {value}, using true")),
            }
        }

        if let Some(value) = table.get("dividerColor") {
            match value.as_str() {
                Some(color) => settings.divider_color = color.to_string(),
                None => issues.push(format!(
                    "Invalid divider color {value}, using {DEFAULT_COLOR}"
                )),
            }
        }

        if let Some(value) = table.get("dividerThickness") {
            match value.as_integer() {
                Some(thickness) => {
                    let clamped =
                        thickness.clamp(i64::from(MIN_THICKNESS), i64::from(MAX_THICKNESS));
                    if clamped != thickness {
                        issues.push(format!(
                            "Divider thickness {thickness} is outside \
                             {MIN_THICKNESS}-{MAX_THICKNESS}, using {clamped}"
                        ));
                    }
                    settings.divider_thickness = u8::try_from(clamped).unwrap_or(DEFAULT_THICKNESS);
                }
                None => issues.push(format!(
                    "Invalid divider thickness {value}, using {DEFAULT_THICKNESS}"
                )),
            }
        }

        if let Some(value) = table.get("dividers") {
            match value.as_array() {
                Some(entries) => {
                    let records: Vec<DividerRecord> = entries
                        .iter()
                        .enumerate()
                        .filter_map(|(index, entry)| {
                            record_from_value(index + 1, entry, &mut issues)
                        })
                        .collect();
                    settings.dividers = DividerStore::from(records);
                }
                None => issues.push("Dividers must be a list, ignoring them".to_string()),
            }
        }

        issues.extend(settings.heal());
        (settings, issues)
    }

    /// Parses a settings document, logging every value that had to be repaired.
    pub fn from_toml(content: &str) -> Self {
        let (settings, issues) = Self::parse_toml(content);
        for issue in &issues {
            warn!("{issue}");
        }
        settings
    }
}

/// Reads one divider entry. The 1-based `index` only labels messages.
///
/// Entries without a usable name, type or position are skipped. An unknown
/// style keeps the entry and falls back to a line.
fn record_from_value(
    index: usize,
    value: &toml::Value,
    issues: &mut Vec<String>,
) -> Option<DividerRecord> {
    let Some(entry) = value.as_table() else {
        issues.push(format!("Divider #{index} is not a table, skipped"));
        return None;
    };

    let item_name = entry.get("itemName").and_then(toml::Value::as_str);
    let item_type = entry
        .get("itemType")
        .and_then(toml::Value::as_str)
        .and_then(|s| s.parse::<ItemKind>().ok());
    let position = entry
        .get("position")
        .and_then(toml::Value::as_str)
        .and_then(|s| s.parse::<Position>().ok());

    let (Some(item_name), Some(item_type), Some(position)) = (item_name, item_type, position)
    else {
        issues.push(format!(
            "Divider #{index} has no valid itemName, itemType or position, skipped"
        ));
        return None;
    };

    let style = match entry.get("style") {
        None => DividerStyle::Line,
        Some(value) => match value.as_str().and_then(|s| s.parse::<DividerStyle>().ok()) {
            Some(style) => style,
            None => {
                issues.push(format!("Divider '{item_name}' has unknown style {value}, using line"));
                DividerStyle::Line
            }
        },
    };

    Some(DividerRecord {
        item_name: item_name.to_string(),
        item_type,
        position,
        style,
    })
}

/// Export formats supported by [`export_settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Yaml,
    Toml,
}

impl ExportFormat {
    /// Guesses the format from a file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ExportFormat::Json,
            Some("yaml") | Some("yml") => ExportFormat::Yaml,
            _ => ExportFormat::Toml,
        }
    }
}

/// Serializes settings in the requested format.
pub fn export_settings(settings: &Settings, format: ExportFormat) -> Result<String> {
    let content = match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(settings).context("Failed to serialize to JSON")?
        }
        ExportFormat::Yaml => serde_yaml::to_string(settings).context("Failed to serialize to YAML")?,
        ExportFormat::Toml => {
            toml::to_string_pretty(settings).context("Failed to serialize to TOML")?
        }
    };
    Ok(content)
}

/// Loads and saves [`Settings`].
pub trait SettingsProvider {
    /// Returns the stored settings merged over the defaults.
    fn load_settings(&self) -> Result<Settings>;
    fn save_settings(&self, settings: &Settings) -> Result<()>;
    fn settings_path(&self) -> Option<PathBuf>;
}

/// Keeps settings in a TOML file.
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Uses `.tree-dividers.toml` inside `dir`.
    pub fn new_at(dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    /// Uses an explicit file path.
    pub fn with_path(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    /// Writes default settings unless a file is already present.
    pub fn initialize(&self) -> Result<()> {
        if self.settings_path.exists() {
            return Ok(());
        }
        self.save_settings(&Settings::default())
    }
}

impl SettingsProvider for SettingsManager {
    fn load_settings(&self) -> Result<Settings> {
        if !self.settings_path.exists() {
            debug!(
                "No settings at {}, using defaults",
                self.settings_path.display()
            );
            return Ok(Settings::default());
        }

        let content =
            fs::read_to_string(&self.settings_path).context("Failed to read settings file")?;
        Ok(Settings::from_toml(&content))
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        if let Some(parent) = self.settings_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        fs::write(&self.settings_path, content).context("Failed to write settings file")?;
        debug!("Saved settings to {}", self.settings_path.display());
        Ok(())
    }

    fn settings_path(&self) -> Option<PathBuf> {
        Some(self.settings_path.clone())
    }
}

/// Keeps settings in memory. Clones share the stored value, and every save is counted.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    stored: Rc<RefCell<Option<Settings>>>,
    saves: Rc<RefCell<usize>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        let memory = Self::default();
        *memory.stored.borrow_mut() = Some(settings);
        memory
    }

    pub fn stored(&self) -> Option<Settings> {
        self.stored.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SettingsProvider for MemorySettings {
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = self.stored.borrow().clone().unwrap_or_default();
        for issue in settings.heal() {
            warn!("{issue}");
        }
        Ok(settings)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        *self.stored.borrow_mut() = Some(settings.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn settings_path(&self) -> Option<PathBuf> {
        None
    }
}
