use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::builders::store::{DividerRecord, DividerStyle};
use crate::core::config::{MAX_THICKNESS, MIN_THICKNESS, Settings};

const COLOR_PATTERN: &str = r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$";

/// The compiled color pattern, built once. `None` only if the pattern failed
/// to compile, in which case no color is accepted.
fn color_regex() -> Option<&'static Regex> {
    static COLOR: OnceLock<Option<Regex>> = OnceLock::new();
    COLOR.get_or_init(|| Regex::new(COLOR_PATTERN).ok()).as_ref()
}

/// Accepts `#rgb` and `#rrggbb` hex colors.
pub fn is_valid_color(color: &str) -> bool {
    color_regex().is_some_and(|re| re.is_match(color))
}

/// The `SettingsValidator` trait defines the interface for checking stored settings.
///
/// Validation never mutates anything; it only describes problems. Healing on
/// load is done by [`Settings::heal`].
pub trait SettingsValidator {
    /// Performs a full validation of the settings and returns the issues found.
    ///
    /// # Arguments
    /// * `settings`: The `Settings` to be validated.
    ///
    /// # Returns
    /// A `Result<Vec<String>>` where each string describes one issue.
    fn validate_settings(&self, settings: &Settings) -> Result<Vec<String>>;

    /// Validates a single divider record.
    fn validate_record(&self, record: &DividerRecord) -> Vec<String>;
}

/// The standard set of checks: color format, thickness range, record names
/// and duplicate records.
pub struct StandardValidator;

impl StandardValidator {
    pub fn new() -> Self {
        Self
    }

    /// Reports every triple that appears more than once.
    fn check_duplicates(&self, records: &[DividerRecord]) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for record in records {
            let key = (record.item_name.as_str(), record.item_type, record.position);
            if !seen.insert(key) {
                warnings.push(format!(
                    "Duplicate divider {} {} '{}'",
                    record.position, record.item_type, record.item_name
                ));
            }
        }
        warnings
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsValidator for StandardValidator {
    fn validate_settings(&self, settings: &Settings) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if !is_valid_color(&settings.divider_color) {
            issues.push(format!(
                "Invalid divider color: {} (expected #rgb or #rrggbb)",
                settings.divider_color
            ));
        }

        if !(MIN_THICKNESS..=MAX_THICKNESS).contains(&settings.divider_thickness) {
            issues.push(format!(
                "Divider thickness {} is outside {MIN_THICKNESS}-{MAX_THICKNESS}",
                settings.divider_thickness
            ));
        }

        issues.extend(self.check_duplicates(settings.dividers.records()));

        for record in settings.dividers.iter() {
            issues.extend(self.validate_record(record));
        }

        Ok(issues)
    }

    fn validate_record(&self, record: &DividerRecord) -> Vec<String> {
        let mut issues = Vec::new();

        if record.item_name.trim().is_empty() {
            issues.push(format!("Divider {} has an empty item name", record.position));
        }
        if record.item_name.contains('/') {
            issues.push(format!(
                "Divider item name '{}' looks like a path; dividers match display names",
                record.item_name
            ));
        }
        // Only lines are drawn today; other styles are stored but render as lines.
        if record.style != DividerStyle::Line {
            issues.push(format!(
                "Divider style '{}' for '{}' renders as a line",
                record.style, record.item_name
            ));
        }

        issues
    }
}
