use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub root: Root,
    pub server: Server,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub manifest: Manifest,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Root {
    pub root_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limits {
    /// Fallback byte cap for files with no per-extension limit.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum path depth, counted in components from the filesystem root.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}
fn default_max_depth() -> usize {
    10
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_depth: default_max_depth(),
        }
    }
}

/// The set of files that defines a scenario directory, plus per-extension
/// size caps. Fixed at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Manifest {
    #[serde(default = "default_required")]
    pub required: Vec<String>,
    #[serde(default = "default_optional")]
    pub optional: Vec<String>,
    /// Extension (without the dot, lowercase) to maximum byte size.
    #[serde(default = "default_size_limits")]
    pub size_limits: HashMap<String, u64>,
    #[serde(default = "default_options_file")]
    pub options_file: String,
    #[serde(default = "default_description_file")]
    pub description_file: String,
}

fn default_required() -> Vec<String> {
    vec![default_options_file(), default_description_file()]
}

fn default_optional() -> Vec<String> {
    [
        "SolarSystemConfig.yaml",
        "RandomSolarSystemConfig.yaml",
        "preview.jpg",
        "preview.png",
        "playfield.yaml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_size_limits() -> HashMap<String, u64> {
    let mut m = HashMap::new();
    m.insert("yaml".to_string(), 10 * 1024 * 1024);
    m.insert("yml".to_string(), 10 * 1024 * 1024);
    m.insert("txt".to_string(), 1024 * 1024);
    m.insert("jpg".to_string(), 5 * 1024 * 1024);
    m.insert("png".to_string(), 5 * 1024 * 1024);
    m
}

fn default_options_file() -> String {
    "gameoptions.yaml".to_string()
}
fn default_description_file() -> String {
    "description.txt".to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            required: default_required(),
            optional: default_optional(),
            size_limits: default_size_limits(),
            options_file: default_options_file(),
            description_file: default_description_file(),
        }
    }
}

impl Manifest {
    /// Byte cap for a manifest-relative file name, by extension.
    pub fn size_limit(&self, file_name: &str, default: u64) -> u64 {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .and_then(|e| self.size_limits.get(&e).copied())
            .unwrap_or(default)
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.root.root_dir.is_dir() {
            anyhow::bail!(
                "root_dir does not exist or is not a directory: {}",
                self.root.root_dir.display()
            );
        }
        if self.limits.max_file_size == 0 {
            anyhow::bail!("max_file_size must be > 0");
        }
        if self.limits.max_depth == 0 {
            anyhow::bail!("max_depth must be > 0");
        }
        if self.manifest.required.is_empty() {
            anyhow::bail!("manifest.required must not be empty");
        }
        if !self.manifest.required.contains(&self.manifest.options_file) {
            anyhow::bail!("manifest.required must include options_file");
        }
        if !self.manifest.required.contains(&self.manifest.description_file) {
            anyhow::bail!("manifest.required must include description_file");
        }
        if let Some(dup) = self
            .manifest
            .optional
            .iter()
            .find(|f| self.manifest.required.contains(f))
        {
            anyhow::bail!("manifest.optional repeats required file: {dup}");
        }
        Ok(())
    }
}

pub fn canonical_root(root: &Path) -> anyhow::Result<PathBuf> {
    let c = dunce::canonicalize(root)?;
    Ok(c)
}
