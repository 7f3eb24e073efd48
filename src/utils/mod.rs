pub mod tree;

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::importer::{DividerImporter, FileImporter};
use crate::builders::reporter::{ConsoleReporter, PanelReporter};
use crate::builders::store::{ItemKind, Position};
use crate::builders::validator::{SettingsValidator, StandardValidator};
use crate::core::config::{
    ExportFormat, Settings, SettingsManager, SettingsProvider, export_settings,
};
use crate::core::engine::{Command, DividerEngine};
use crate::core::host::{ConsoleNotifier, MemoryStyleSink, TreeItem};
use crate::utils::tree::FsTree;

/// Where the host binary finds its tree and settings file.
pub struct HostContext {
    pub root: PathBuf,
    pub settings_path: PathBuf,
}

impl HostContext {
    pub fn new(root: PathBuf, settings_path: Option<PathBuf>) -> Self {
        let settings_path =
            settings_path.unwrap_or_else(|| root.join(crate::core::config::SETTINGS_FILE));
        Self {
            root,
            settings_path,
        }
    }

    fn manager(&self) -> SettingsManager {
        SettingsManager::with_path(self.settings_path.clone())
    }

    /// Activates an engine over the on-disk tree. The returned sink handle
    /// observes everything the engine renders.
    fn engine(&self) -> Result<(DividerEngine, MemoryStyleSink)> {
        let sink = MemoryStyleSink::new();
        let engine = DividerEngine::activate(
            Box::new(self.manager()),
            Box::new(FsTree::new(&self.root)),
            Box::new(sink.clone()),
            Box::new(ConsoleNotifier),
        )?;
        Ok((engine, sink))
    }
}

pub fn initialize(ctx: &HostContext) -> Result<()> {
    ctx.manager().initialize()?;
    println!("✓ Initialized dividers at {}", ctx.settings_path.display());
    Ok(())
}

pub fn add(ctx: &HostContext, name: &str, kind: ItemKind, position: Position) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    engine.add_divider(name, kind, position)?;
    engine.shutdown()
}

pub fn remove(ctx: &HostContext, name: &str, kind: ItemKind, position: Position) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    engine.remove_divider(name, kind, position)?;
    engine.shutdown()
}

pub fn remove_all(ctx: &HostContext, name: &str, kind: ItemKind) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    engine.remove_all_dividers(name, kind)?;
    engine.shutdown()
}

pub fn run_command(ctx: &HostContext, command: Command) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    engine.execute(command)?;
    engine.shutdown()
}

pub fn set_color(ctx: &HostContext, color: &str) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    engine.set_color(color)?;
    println!("✓ Divider color set to {color}");
    engine.shutdown()
}

pub fn set_thickness(ctx: &HostContext, thickness: u8) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    engine.set_thickness(thickness)?;
    println!("✓ Divider thickness set to {thickness}");
    engine.shutdown()
}

pub fn list(ctx: &HostContext) -> Result<()> {
    let settings = ctx.manager().load_settings()?;
    let panel = crate::builders::reporter::SettingsPanel::from_settings(&settings);
    print!("{}", ConsoleReporter::new().render_panel(&panel));
    Ok(())
}

/// Applies dividers to the tree under the root and prints the result.
pub fn render(ctx: &HostContext, css_out: Option<&Path>) -> Result<()> {
    let (mut engine, sink) = ctx.engine()?;
    let snapshot = sink.snapshot();

    if snapshot.is_empty() {
        if engine.is_enabled() {
            println!("No dividers to render.");
        } else {
            println!("Dividers are disabled.");
        }
        return engine.shutdown();
    }

    println!("Tagged items:");
    for (path, tags) in &snapshot.markers {
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        println!("  {path}: {}", tags.join(" "));
    }

    let css: String = snapshot.styles.values().cloned().collect();
    match css_out {
        Some(path) => {
            fs::write(path, &css).context("Failed to write stylesheet")?;
            println!("✓ Wrote stylesheet to {}", path.display());
        }
        None => {
            println!("\nStylesheet:");
            print!("{css}");
        }
    }
    engine.shutdown()
}

/// Prints the context-menu entries for an item, optionally running one.
pub fn menu(ctx: &HostContext, path: &str, kind: ItemKind, run: Option<usize>) -> Result<()> {
    let (mut engine, _) = ctx.engine()?;
    let item = TreeItem::from_path(path.trim_end_matches('/'), kind);
    let actions = engine.context_menu(&item);

    match run {
        Some(index) => {
            let action = index
                .checked_sub(1)
                .and_then(|i| actions.get(i))
                .with_context(|| format!("No menu entry {index} for '{}'", item.name))?;
            debug!("Running menu entry '{}'", action.label);
            engine.run_menu_action(action)?;
        }
        None => {
            for (i, action) in actions.iter().enumerate() {
                println!("{}. {}", i + 1, action.label);
            }
        }
    }
    engine.shutdown()
}

pub fn validate(ctx: &HostContext) -> Result<()> {
    let content = match fs::read_to_string(&ctx.settings_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("✓ No settings file; defaults are valid.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to read settings file"),
    };
    // Repairs made while loading are problems in the file itself.
    let (settings, mut issues) = Settings::parse_toml(&content);
    issues.extend(StandardValidator::new().validate_settings(&settings)?);

    if issues.is_empty() {
        println!("✓ Settings are valid.");
        Ok(())
    } else {
        println!("⚠️  Found issues in settings:");
        for issue in issues {
            println!("  - {issue}");
        }
        anyhow::bail!("Settings validation failed.");
    }
}

pub fn export(ctx: &HostContext, out: &Path, format: Option<ExportFormat>) -> Result<()> {
    let settings = ctx.manager().load_settings()?;
    let format = format.unwrap_or_else(|| ExportFormat::from_path(out));
    let content = export_settings(&settings, format)?;
    fs::write(out, content).context("Failed to write export file")?;
    println!("✓ Exported {} divider(s) to {}", settings.dividers.len(), out.display());
    Ok(())
}

pub fn import(ctx: &HostContext, input: &Path) -> Result<()> {
    let records = FileImporter::new().import_from_file(input)?;
    let (mut engine, _) = ctx.engine()?;
    engine.import_records(records)?;
    engine.shutdown()
}

pub fn list_commands() {
    for command in Command::ALL {
        println!("{:<20} {}", command.id(), command.name());
    }
}
