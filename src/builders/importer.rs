use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::builders::store::{AddOutcome, DividerRecord, DividerStore};
use crate::core::config::{ExportFormat, Settings};

/// Accepts either a full settings export or a bare list of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Settings(Settings),
    Records(Vec<DividerRecord>),
}

/// YAML and JSON may hold a bare list at the top level; TOML cannot, so a
/// TOML list must sit under a `dividers` key, which reads as a settings document.
fn parse_records(content: &str, format: ExportFormat) -> Result<Vec<DividerRecord>> {
    let document: ImportDocument = match format {
        ExportFormat::Json => serde_json::from_str(content).context("Failed to parse JSON import")?,
        ExportFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML import")?,
        ExportFormat::Toml => {
            ImportDocument::Settings(toml::from_str(content).context("Failed to parse TOML import")?)
        }
    };

    Ok(match document {
        ImportDocument::Settings(settings) => settings.dividers.records().to_vec(),
        ImportDocument::Records(records) => records,
    })
}

/// A source of divider records to merge into an existing store.
pub trait DividerImporter {
    /// Reads records from `path`.
    ///
    /// # Arguments
    /// * `path`: The file to import. The format is taken from its extension.
    fn import_from_file(&self, path: &Path) -> Result<Vec<DividerRecord>>;
}

pub struct FileImporter;

impl FileImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DividerImporter for FileImporter {
    fn import_from_file(&self, path: &Path) -> Result<Vec<DividerRecord>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read import file {}", path.display()))?;
        parse_records(&content, ExportFormat::from_path(path))
    }
}

/// Merges records into the store, skipping any triple already present.
/// Returns how many records were added.
pub fn merge_records(store: &mut DividerStore, records: Vec<DividerRecord>) -> usize {
    records
        .into_iter()
        .filter(|r| !r.item_name.trim().is_empty())
        .map(|r| store.insert(r))
        .filter(|outcome| *outcome == AddOutcome::Added)
        .count()
}
