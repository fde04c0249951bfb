pub mod detect;
pub mod loader;
pub mod structure;

use serde::Serialize;
use std::collections::BTreeMap;

/// Lightweight summary of a validated scenario directory. Recomputed on
/// demand, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioPreview {
    pub name: String,
    pub path: String,
    pub description: String,
    pub preview_image: Option<String>,
    pub game_mode: String,
    pub multiplayer_ready: bool,
}

/// Full loaded scenario: the preview, every configuration file keyed by
/// its logical name, and the structural walk result.
#[derive(Debug, Serialize)]
pub struct ScenarioDocument {
    pub metadata: ScenarioPreview,
    pub files: BTreeMap<String, FileEntry>,
    pub structure: StructureSummary,
}

/// Per-file load outcome. A parse failure on one file is recorded here
/// instead of failing the whole document.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileEntry {
    // Parsed with serde_yaml but held as a JSON tree so the document
    // serializes without surprises (YAML allows non-string mapping keys).
    Yaml {
        path: String,
        content: serde_json::Value,
    },
    Text {
        path: String,
        content: String,
    },
    Error {
        path: String,
        error: String,
    },
}

/// Inventory produced by the recursive walk of a scenario directory.
#[derive(Debug, Default, Serialize)]
pub struct StructureSummary {
    pub directories: Vec<String>,
    pub files: Vec<String>,
    pub playfields_count: usize,
    pub prefabs_count: usize,
    pub has_content: bool,
    pub has_custom_configs: bool,
}
