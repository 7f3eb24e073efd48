use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tree_dividers::builders::importer::{DividerImporter, FileImporter};
use tree_dividers::builders::store::{ItemKind, Position};
use tree_dividers::core::config::{
    ExportFormat, SettingsManager, SettingsProvider, export_settings,
};
use tree_dividers::core::engine::DividerEngine;
use tree_dividers::core::host::{MemoryNotifier, MemoryStyleSink};
use tree_dividers::utils::HostContext;
use tree_dividers::utils::tree::FsTree;

fn setup_vault() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("Animals/Cats")).unwrap();
    fs::create_dir_all(root.join("Animals2")).unwrap();
    fs::create_dir_all(root.join("Science")).unwrap();
    fs::write(root.join("Science/todo.md"), "- [ ] read").unwrap();
    fs::write(root.join("todo.txt"), "").unwrap();
    dir
}

fn activate(root: &Path) -> (DividerEngine, MemoryStyleSink, MemoryNotifier) {
    let sink = MemoryStyleSink::new();
    let notes = MemoryNotifier::new();
    let engine = DividerEngine::activate(
        Box::new(SettingsManager::new_at(root)),
        Box::new(FsTree::new(root)),
        Box::new(sink.clone()),
        Box::new(notes.clone()),
    )
    .unwrap();
    (engine, sink, notes)
}

#[test]
fn test_core_workflow() {
    let dir = setup_vault();
    let root = dir.path();

    // 1. Record dividers against the on-disk tree
    let (mut engine, sink, notes) = activate(root);
    engine
        .add_divider("Animals", ItemKind::Folder, Position::Below)
        .unwrap();
    engine
        .add_divider("todo", ItemKind::File, Position::Above)
        .unwrap();
    assert_eq!(notes.messages().len(), 2);

    // 2. Folder matching is exact, file matching ignores extensions
    let markers = sink.snapshot().markers;
    assert!(markers.contains_key("Animals"));
    assert!(!markers.contains_key("Animals2"));
    assert!(!markers.contains_key("Animals/Cats"));
    assert!(markers.contains_key("Science/todo.md"));
    assert!(markers.contains_key("todo.txt"));

    // 3. Shutdown retracts, settings survive on disk
    engine.shutdown().unwrap();
    assert!(sink.snapshot().is_empty());

    let (engine, sink, _) = activate(root);
    assert_eq!(engine.settings().dividers.len(), 2);
    assert_eq!(sink.snapshot().markers.len(), 3);
}

#[test]
fn test_new_files_are_picked_up_on_refresh() {
    let dir = setup_vault();
    let root = dir.path();

    let (mut engine, sink, _) = activate(root);
    engine
        .add_divider("Reading", ItemKind::Folder, Position::Above)
        .unwrap();
    assert!(sink.snapshot().markers.is_empty());

    fs::create_dir(root.join("Reading")).unwrap();
    let now = std::time::Instant::now();
    engine.notify_tree_changed(now);
    assert!(
        engine
            .poll_refresh(now + std::time::Duration::from_secs(1))
            .unwrap()
    );
    assert!(sink.snapshot().markers.contains_key("Reading"));
}

#[test]
fn test_partial_settings_file_is_merged_over_defaults() {
    let dir = setup_vault();
    let root = dir.path();
    fs::write(
        root.join(".tree-dividers.toml"),
        "[[dividers]]\nitemName = \"Science\"\nitemType = \"folder\"\nposition = \"above\"\n",
    )
    .unwrap();

    let (engine, sink, _) = activate(root);
    assert!(engine.is_enabled());
    assert_eq!(engine.settings().divider_thickness, 2);
    let css = sink.snapshot().styles.values().cloned().collect::<String>();
    assert!(css.contains("top: -10px"));
    assert!(css.contains("background-color: #555555"));
}

#[test]
fn test_out_of_range_thickness_keeps_dividers_and_fails_validation() {
    let dir = setup_vault();
    let root = dir.path();
    fs::write(
        root.join(".tree-dividers.toml"),
        "dividerThickness = 300\n\n[[dividers]]\nitemName = \"Science\"\nitemType = \"folder\"\nposition = \"above\"\n",
    )
    .unwrap();

    let ctx = HostContext::new(root.to_path_buf(), None);
    assert!(tree_dividers::utils::validate(&ctx).is_err());

    let (engine, sink, _) = activate(root);
    assert_eq!(engine.settings().divider_thickness, 5);
    assert_eq!(engine.settings().dividers.len(), 1);
    assert!(sink.snapshot().markers.contains_key("Science"));
}

#[test]
fn test_export_then_import_into_another_vault() {
    let source = setup_vault();
    let (mut engine, _, _) = activate(source.path());
    engine
        .add_divider("Animals", ItemKind::Folder, Position::Above)
        .unwrap();
    engine
        .add_divider("todo.md", ItemKind::File, Position::Below)
        .unwrap();

    let export_path = source.path().join("dividers.json");
    let settings = SettingsManager::new_at(source.path()).load_settings().unwrap();
    fs::write(&export_path, export_settings(&settings, ExportFormat::Json).unwrap()).unwrap();

    let target = setup_vault();
    let (mut other, sink, notes) = activate(target.path());
    other
        .add_divider("Animals", ItemKind::Folder, Position::Above)
        .unwrap();

    let records = FileImporter::new().import_from_file(&export_path).unwrap();
    assert_eq!(other.import_records(records).unwrap(), 1);
    assert_eq!(notes.last().unwrap(), "Imported 1 divider(s)");
    assert_eq!(other.settings().dividers.len(), 2);
    assert!(sink.snapshot().markers.contains_key("Science/todo.md"));
}
