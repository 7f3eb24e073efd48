//! Reference host for the divider engine.
//!
//! The engine is meant to live inside a tree view (a file explorer, a notes
//! vault). This binary stands in for that host: the tree is a directory on
//! disk, notifications go to stdout and rendered styles are printed or
//! written to a stylesheet.
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tree_dividers::builders::store::{ItemKind, Position};
use tree_dividers::core::config::ExportFormat;
use tree_dividers::core::engine::Command;
use tree_dividers::utils::{self, HostContext};

#[derive(Parser)]
#[command(name = "tree-dividers")]
#[command(about = "Manage visual dividers between items of a file tree")]
struct Cli {
    /// Root of the tree dividers are rendered for
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Settings file (defaults to <root>/.tree-dividers.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a settings file with default values
    Init,
    /// Add a divider to an item
    Add {
        name: String,
        #[arg(long, value_enum)]
        kind: ItemKind,
        #[arg(long, value_enum)]
        position: Position,
    },
    /// Remove one divider from an item
    Remove {
        name: String,
        #[arg(long, value_enum)]
        kind: ItemKind,
        #[arg(long, value_enum)]
        position: Position,
    },
    /// Remove every divider from an item
    RemoveAll {
        name: String,
        #[arg(long, value_enum)]
        kind: ItemKind,
    },
    /// Remove all dividers
    Clear,
    /// Turn divider rendering on or off
    Toggle,
    /// Set the divider color (#rgb or #rrggbb)
    Color { color: String },
    /// Set the divider thickness (1-5)
    Thickness {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        thickness: u8,
    },
    /// Show settings and configured dividers
    List,
    /// Render dividers for the tree and print the tagged items and stylesheet
    Render {
        /// Write the stylesheet to this file instead of printing it
        #[arg(long)]
        css_out: Option<PathBuf>,
    },
    /// Show the divider menu for an item, or run one of its entries
    Menu {
        /// Path of the item relative to the root
        path: String,
        #[arg(long, value_enum)]
        kind: ItemKind,
        /// 1-based menu entry to run
        #[arg(long)]
        run: Option<usize>,
    },
    /// Check the settings file for problems
    Validate,
    /// Export settings to a JSON, YAML or TOML file
    Export {
        path: PathBuf,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },
    /// Import dividers from an exported file
    Import { path: PathBuf },
    /// List the named commands the engine registers with a host
    ListCommands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let ctx = HostContext::new(cli.root, cli.config);

    match cli.command {
        Commands::Init => utils::initialize(&ctx),
        Commands::Add {
            name,
            kind,
            position,
        } => utils::add(&ctx, &name, kind, position),
        Commands::Remove {
            name,
            kind,
            position,
        } => utils::remove(&ctx, &name, kind, position),
        Commands::RemoveAll { name, kind } => utils::remove_all(&ctx, &name, kind),
        Commands::Clear => utils::run_command(&ctx, Command::ClearAllDividers),
        Commands::Toggle => utils::run_command(&ctx, Command::ToggleDividers),
        Commands::Color { color } => utils::set_color(&ctx, &color),
        Commands::Thickness { thickness } => utils::set_thickness(&ctx, thickness),
        Commands::List => utils::list(&ctx),
        Commands::Render { css_out } => utils::render(&ctx, css_out.as_deref()),
        Commands::Menu { path, kind, run } => utils::menu(&ctx, &path, kind, run),
        Commands::Validate => utils::validate(&ctx),
        Commands::Export { path, format } => utils::export(&ctx, &path, format),
        Commands::Import { path } => utils::import(&ctx, &path),
        Commands::ListCommands => {
            utils::list_commands();
            Ok(())
        }
    }
}
