use crate::config::{Config, Limits, Manifest};
use crate::errors::{ValidationError, ValidationResult};
use crate::scenario::{detect, structure, FileEntry, ScenarioDocument, ScenarioPreview};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Well-known configuration files loaded into a document, beyond the
/// primary options file: relative path and logical name.
const EXTRA_CONFIG_FILES: &[(&str, &str)] = &[
    ("SolarSystemConfig.yaml", "Solar System Config"),
    ("RandomPresets/SolarSystemConfig.yaml", "Random Solar System Config"),
];

/// Loads and summarizes scenario directories that already passed path
/// validation. Stateless apart from the immutable manifest configuration.
#[derive(Debug, Clone)]
pub struct ScenarioLoader {
    manifest: Manifest,
    limits: Limits,
}

impl ScenarioLoader {
    pub fn new(cfg: &Config) -> Self {
        Self {
            manifest: cfg.manifest.clone(),
            limits: cfg.limits.clone(),
        }
    }

    pub fn is_valid_scenario(&self, dir: &Path) -> bool {
        detect::is_valid_scenario(&self.manifest, self.limits.max_file_size, dir)
    }

    /// Best-effort preview. Only an invalid scenario directory fails;
    /// unreadable metadata degrades to defaults instead.
    pub fn preview(&self, dir: &Path) -> ValidationResult<ScenarioPreview> {
        if !self.is_valid_scenario(dir) {
            return Err(ValidationError::InvalidScenario {
                path: dir.display().to_string(),
            });
        }

        let mut preview = ScenarioPreview {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: dir.display().to_string(),
            description: String::new(),
            preview_image: None,
            game_mode: "Unknown".to_string(),
            multiplayer_ready: false,
        };

        match fs::read_to_string(dir.join(&self.manifest.description_file)) {
            Ok(text) => preview.description = text.trim().to_string(),
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "description unreadable, defaulting to empty");
            }
        }

        for candidate in ["preview.jpg", "preview.png"] {
            if dir.join(candidate).is_file() {
                preview.preview_image = Some(candidate.to_string());
                break;
            }
        }

        if let Some(doc) = load_yaml(&dir.join(&self.manifest.options_file)) {
            apply_game_options(&mut preview, &doc);
        }

        Ok(preview)
    }

    /// Full load: preview, per-file parse results, structural walk. Each
    /// file is attempted independently; a corrupt one becomes an error
    /// entry in the mapping rather than a failed load.
    pub fn load(&self, dir: &Path) -> ValidationResult<ScenarioDocument> {
        let metadata = self.preview(dir)?;

        let mut files = BTreeMap::new();
        let mut entries: Vec<(String, String)> = vec![(
            self.manifest.options_file.clone(),
            "Game Options".to_string(),
        )];
        entries.extend(
            EXTRA_CONFIG_FILES
                .iter()
                .map(|(rel, name)| (rel.to_string(), name.to_string())),
        );

        for (rel, logical_name) in entries {
            let full = dir.join(&rel);
            if !full.exists() {
                continue;
            }
            files.insert(logical_name, self.load_entry(dir, &rel, &full));
        }

        let structure = structure::analyze(dir);
        Ok(ScenarioDocument {
            metadata,
            files,
            structure,
        })
    }

    fn load_entry(&self, dir: &Path, rel: &str, full: &Path) -> FileEntry {
        let is_yaml = rel.ends_with(".yaml") || rel.ends_with(".yml");
        let text = match fs::read_to_string(full) {
            Ok(t) => t,
            Err(e) => return self.entry_error(dir, rel, e.to_string()),
        };
        if is_yaml {
            match serde_yaml::from_str::<serde_json::Value>(&text) {
                Ok(content) => FileEntry::Yaml {
                    path: rel.to_string(),
                    content,
                },
                Err(e) => self.entry_error(dir, rel, e.to_string()),
            }
        } else {
            FileEntry::Text {
                path: rel.to_string(),
                content: text,
            }
        }
    }

    fn entry_error(&self, dir: &Path, rel: &str, reason: String) -> FileEntry {
        let err = ValidationError::ScenarioLoad {
            path: dir.display().to_string(),
            file: rel.to_string(),
            reason,
        };
        debug!(error = %err, "scenario file failed to load");
        FileEntry::Error {
            path: rel.to_string(),
            error: err.to_string(),
        }
    }
}

fn load_yaml(path: &Path) -> Option<serde_json::Value> {
    let text = fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&text) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "yaml parse failed");
            None
        }
    }
}

/// Reads the `Options` groups for audience tags. A group valid for `MP`
/// marks the scenario multiplayer-ready; `SP` together with `Creative` on
/// the same group labels it single-player, taking precedence over a lone
/// multiplayer marker.
fn apply_game_options(preview: &mut ScenarioPreview, doc: &serde_json::Value) {
    let Some(options) = doc.get("Options").and_then(|v| v.as_array()) else {
        return;
    };
    for group in options {
        let Some(valid_for) = group.get("ValidFor").and_then(|v| v.as_array()) else {
            continue;
        };
        let tags: Vec<&str> = valid_for.iter().filter_map(|v| v.as_str()).collect();
        if tags.contains(&"MP") {
            preview.multiplayer_ready = true;
        }
        if tags.contains(&"SP") && tags.contains(&"Creative") {
            preview.game_mode = "Single Player".to_string();
        } else if tags.contains(&"MP") {
            preview.game_mode = "Multiplayer".to_string();
        }
    }
}
