use anyhow::Result;
use log::{debug, info};
use std::time::{Duration, Instant};

use crate::builders::importer::merge_records;
use crate::builders::menu::{self, MenuAction, MenuIntent};
use crate::builders::reporter::SettingsPanel;
use crate::builders::rules::{self, MARKER_CLASS, RenderState, STYLE_ID};
use crate::builders::store::{AddOutcome, DividerRecord, ItemKind, Position};
use crate::builders::validator::is_valid_color;
use crate::core::config::{MAX_THICKNESS, MIN_THICKNESS, Settings, SettingsProvider};
use crate::core::host::{Notifier, StyleSink, TreeItem, TreeProvider};

/// Window in which bursts of tree-change signals collapse into one apply.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(100);

/// Coalesces bursts of signals: each signal pushes the deadline out, and only
/// the last one in a window fires.
#[derive(Debug, Clone)]
pub struct RefreshDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl RefreshDebouncer {
    /// Creates a new `RefreshDebouncer` with nothing pending.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` once per burst, when the window after the last signal has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Parameterless actions exposed to the host's command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleDividers,
    ClearAllDividers,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::ToggleDividers, Command::ClearAllDividers];

    pub fn id(&self) -> &'static str {
        match self {
            Command::ToggleDividers => "toggle-dividers",
            Command::ClearAllDividers => "clear-all-dividers",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleDividers => "Toggle divider rendering",
            Command::ClearAllDividers => "Clear all dividers",
        }
    }
}

/// Owns the settings and drives every apply/retract cycle.
///
/// Mutations persist the settings, re-apply (when enabled) and notify the user,
/// in that order. Nothing is batched.
pub struct DividerEngine {
    settings: Settings,
    provider: Box<dyn SettingsProvider>,
    tree: Box<dyn TreeProvider>,
    sink: Box<dyn StyleSink>,
    notifier: Box<dyn Notifier>,
    rendered: Option<RenderState>,
    debouncer: RefreshDebouncer,
}

impl DividerEngine {
    /// Loads settings and applies them if rendering is enabled.
    pub fn activate(
        provider: Box<dyn SettingsProvider>,
        tree: Box<dyn TreeProvider>,
        sink: Box<dyn StyleSink>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let settings = provider.load_settings()?;
        info!(
            "Loaded {} divider(s), rendering {}",
            settings.dividers.len(),
            if settings.enabled { "enabled" } else { "disabled" }
        );

        let mut engine = Self {
            settings,
            provider,
            tree,
            sink,
            notifier,
            rendered: None,
            debouncer: RefreshDebouncer::new(REFRESH_DEBOUNCE),
        };
        if engine.settings.enabled {
            engine.apply()?;
        }
        Ok(engine)
    }

    /// The live settings, including changes already persisted this session.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// The state emitted by the last apply, or `None` when retracted.
    pub fn render_state(&self) -> Option<&RenderState> {
        self.rendered.as_ref()
    }

    /// Retracts everything, then rebuilds rules and tags from the current
    /// settings and the current live tree.
    pub fn apply(&mut self) -> Result<()> {
        self.retract()?;
        if self.settings.dividers.is_empty() {
            debug!("No dividers to apply");
            return Ok(());
        }

        let items = self.tree.items()?;
        let state = rules::generate(&self.settings.dividers, &self.settings.appearance(), &items);

        self.sink.insert_style(STYLE_ID, &state.stylesheet())?;
        for (path, tags) in &state.tags {
            self.sink.add_marker(path, MARKER_CLASS)?;
            for tag in tags {
                self.sink.add_marker(path, tag)?;
            }
        }
        debug!(
            "Applied {} rule(s) to {} item(s)",
            state.rules.len(),
            state.tags.len()
        );
        self.rendered = Some(state);
        Ok(())
    }

    /// Removes the style block and every marker. Safe to call repeatedly.
    pub fn retract(&mut self) -> Result<()> {
        self.sink.remove_style(STYLE_ID)?;
        self.sink.clear_markers()?;
        self.rendered = None;
        Ok(())
    }

    /// Retracts all rendered effects; stored dividers are left untouched.
    pub fn shutdown(&mut self) -> Result<()> {
        self.debouncer.cancel();
        self.retract()
    }

    fn persist_and_reapply(&mut self) -> Result<()> {
        self.provider.save_settings(&self.settings)?;
        if self.settings.enabled {
            self.apply()
        } else {
            self.retract()
        }
    }

    /// Adds a `Line` divider for the item unless one already exists.
    ///
    /// # Arguments
    /// * `item_name`: The display name to record, as the user sees it.
    /// * `item_type`: Whether the item is a file or a folder.
    /// * `position`: The edge of the item the divider sits on.
    ///
    /// # Returns
    /// Whether the record was added. A duplicate only produces a notice.
    pub fn add_divider(
        &mut self,
        item_name: &str,
        item_type: ItemKind,
        position: Position,
    ) -> Result<AddOutcome> {
        let outcome = self.settings.dividers.add(item_name, item_type, position);
        match outcome {
            AddOutcome::Added => {
                self.persist_and_reapply()?;
                info!("Added divider {position} {item_type} '{item_name}'");
                self.notifier.notify(&format!("Divider added {position} \"{item_name}\""));
            }
            AddOutcome::AlreadyExists => {
                self.notifier.notify(&format!("Divider {position} \"{item_name}\" already exists"));
            }
        }
        Ok(outcome)
    }

    /// Removes the divider identified by the exact recorded triple.
    ///
    /// # Returns
    /// The number of records removed, 0 or 1.
    pub fn remove_divider(
        &mut self,
        item_name: &str,
        item_type: ItemKind,
        position: Position,
    ) -> Result<usize> {
        let removed = self.settings.dividers.remove_one(item_name, item_type, position);
        if removed > 0 {
            self.persist_and_reapply()?;
            self.notifier.notify(&format!("Divider removed {position} \"{item_name}\""));
        } else {
            self.notifier.notify(&format!("No divider {position} \"{item_name}\" to remove"));
        }
        Ok(removed)
    }

    /// Removes the dividers on both edges of an item.
    pub fn remove_all_dividers(&mut self, item_name: &str, item_type: ItemKind) -> Result<usize> {
        let removed = self.settings.dividers.remove_all(item_name, item_type);
        if removed > 0 {
            self.persist_and_reapply()?;
            self.notifier.notify(&format!("Removed {removed} divider(s) from \"{item_name}\""));
        } else {
            self.notifier.notify(&format!("No dividers on \"{item_name}\" to remove"));
        }
        Ok(removed)
    }

    /// Empties the store. Nothing is saved when it was already empty.
    ///
    /// # Returns
    /// How many records were cleared.
    pub fn clear_all(&mut self) -> Result<usize> {
        let count = self.settings.dividers.clear();
        if count == 0 {
            self.notifier.notify("No dividers to clear");
            return Ok(0);
        }
        self.persist_and_reapply()?;
        self.notifier.notify(&format!("Cleared {count} divider(s)"));
        Ok(count)
    }

    pub fn has_divider(&self, item_name: &str, item_type: ItemKind, position: Position) -> bool {
        self.settings.dividers.query(item_name, item_type, position)
    }

    /// Flips rendering on or off and returns the new state.
    pub fn toggle(&mut self) -> Result<bool> {
        let enabled = !self.settings.enabled;
        self.set_enabled(enabled)?;
        Ok(enabled)
    }

    /// Persists the flag, then applies or retracts to match it.
    ///
    /// Disabling also drops any refresh still waiting on the debounce window.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.settings.enabled = enabled;
        if !enabled {
            self.debouncer.cancel();
        }
        self.persist_and_reapply()?;
        self.notifier.notify(if enabled {
            "Dividers enabled"
        } else {
            "Dividers disabled"
        });
        Ok(())
    }

    /// Sets the color of every divider.
    ///
    /// # Arguments
    /// * `color`: A `#rgb` or `#rrggbb` hex color. Anything else is rejected
    ///   and leaves the settings unchanged.
    pub fn set_color(&mut self, color: &str) -> Result<()> {
        if !is_valid_color(color) {
            anyhow::bail!("Invalid color '{}': expected #rgb or #rrggbb", color);
        }
        self.settings.divider_color = color.to_string();
        self.persist_and_reapply()
    }

    /// Sets the thickness of every divider, in pixels.
    ///
    /// # Arguments
    /// * `thickness`: Must lie within `MIN_THICKNESS..=MAX_THICKNESS`.
    pub fn set_thickness(&mut self, thickness: u8) -> Result<()> {
        if !(MIN_THICKNESS..=MAX_THICKNESS).contains(&thickness) {
            anyhow::bail!(
                "Thickness must be between {} and {}, got {}",
                MIN_THICKNESS,
                MAX_THICKNESS,
                thickness
            );
        }
        self.settings.divider_thickness = thickness;
        self.persist_and_reapply()
    }

    /// Merges imported records into the store and returns how many were new.
    pub fn import_records(&mut self, records: Vec<DividerRecord>) -> Result<usize> {
        let added = merge_records(&mut self.settings.dividers, records);
        if added > 0 {
            self.persist_and_reapply()?;
        }
        self.notifier.notify(&format!("Imported {added} divider(s)"));
        Ok(added)
    }

    /// Runs a registered command.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        debug!("Executing command {}", command.id());
        match command {
            Command::ToggleDividers => self.toggle().map(|_| ()),
            Command::ClearAllDividers => self.clear_all().map(|_| ()),
        }
    }

    /// The divider entries to show in the item's context menu.
    pub fn context_menu(&self, item: &TreeItem) -> Vec<MenuAction> {
        menu::context_menu(&self.settings.dividers, item)
    }

    /// Carries out a clicked context-menu entry.
    ///
    /// # Arguments
    /// * `action`: An entry built by [`DividerEngine::context_menu`]. Its
    ///   names are the recorded ones, so removal hits the stored records.
    pub fn run_menu_action(&mut self, action: &MenuAction) -> Result<()> {
        match &action.intent {
            MenuIntent::Add {
                item_name,
                item_type,
                position,
            } => self.add_divider(item_name, *item_type, *position).map(|_| ()),
            MenuIntent::Remove {
                item_name,
                item_type,
                position,
            } => self.remove_divider(item_name, *item_type, *position).map(|_| ()),
            MenuIntent::RemoveAll {
                item_names,
                item_type,
            } => {
                for name in item_names {
                    self.remove_all_dividers(name, *item_type)?;
                }
                Ok(())
            }
        }
    }

    /// A read-only view of the settings for the settings panel.
    pub fn panel(&self) -> SettingsPanel {
        SettingsPanel::from_settings(&self.settings)
    }

    /// Records a structural change in the host tree. Ignored while disabled.
    pub fn notify_tree_changed(&mut self, now: Instant) {
        if self.settings.enabled {
            self.debouncer.signal(now);
        }
    }

    /// Runs the pending apply if the debounce window has elapsed.
    /// Returns `true` if an apply happened.
    pub fn poll_refresh(&mut self, now: Instant) -> Result<bool> {
        if !self.debouncer.poll(now) {
            return Ok(false);
        }
        if !self.settings.enabled {
            return Ok(false);
        }
        self.apply()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debouncer_fires_once_after_last_signal() {
        let start = Instant::now();
        let mut debouncer = RefreshDebouncer::new(Duration::from_millis(100));
        assert!(!debouncer.poll(start));

        debouncer.signal(start);
        debouncer.signal(start + Duration::from_millis(60));
        assert!(!debouncer.poll(start + Duration::from_millis(120)));
        assert!(debouncer.poll(start + Duration::from_millis(160)));
        assert!(!debouncer.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_debouncer_cancel() {
        let start = Instant::now();
        let mut debouncer = RefreshDebouncer::new(REFRESH_DEBOUNCE);
        debouncer.signal(start);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_command_registry() {
        let ids: Vec<&str> = Command::ALL.iter().map(Command::id).collect();
        assert_eq!(ids, vec!["toggle-dividers", "clear-all-dividers"]);
        assert_eq!(Command::ToggleDividers.name(), "Toggle divider rendering");
    }
}
