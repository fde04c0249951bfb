use crate::config::{Config, Limits, Manifest};
use crate::errors::{ValidationError, ValidationResult};
use crate::security::{guard, sanitize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Executable-style extensions refused regardless of size, so the browser
/// cannot be used to fetch or stage scripts.
const BLOCKED_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "ps1", "sh", "py", "js"];

/// Turns an arbitrary path string into a trusted absolute path, or a typed
/// failure. Stateless between calls; the filesystem is the only shared
/// resource, so a path that validates now may still be gone when read.
#[derive(Debug, Clone)]
pub struct PathValidator {
    allowed_root: Option<PathBuf>,
    max_file_size: u64,
    max_depth: usize,
    size_limits: HashMap<String, u64>,
}

impl PathValidator {
    /// Validator confined to the configured root. The root is
    /// canonicalized once here and never changes afterwards.
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let root = crate::config::canonical_root(&cfg.root.root_dir)?;
        Ok(Self {
            allowed_root: Some(root),
            max_file_size: cfg.limits.max_file_size,
            max_depth: cfg.limits.max_depth,
            size_limits: cfg.manifest.size_limits.clone(),
        })
    }

    /// Validator with no containment root. Traversal strings are still
    /// rejected lexically; intended for internal tooling, not for paths
    /// that originate from a request.
    pub fn unconstrained(limits: &Limits, manifest: &Manifest) -> Self {
        Self {
            allowed_root: None,
            max_file_size: limits.max_file_size,
            max_depth: limits.max_depth,
            size_limits: manifest.size_limits.clone(),
        }
    }

    /// True when `path` is the allowed root or a descendant of it. With no
    /// root configured everything is considered contained.
    pub fn contains(&self, path: &Path) -> bool {
        match &self.allowed_root {
            Some(root) => path.starts_with(root),
            None => true,
        }
    }

    pub fn validate_directory(&self, raw: &str) -> ValidationResult<PathBuf> {
        let abs = self.resolve_checked(raw)?;
        let meta = fs::metadata(&abs).map_err(|e| ValidationError::from_io(e, &abs))?;
        if !meta.is_dir() {
            return Err(ValidationError::NotADirectory {
                path: abs.display().to_string(),
            });
        }
        if fs::read_dir(&abs).is_err() {
            return Err(ValidationError::PermissionDenied {
                path: abs.display().to_string(),
            });
        }
        let depth = abs.components().count();
        if depth > self.max_depth {
            return Err(ValidationError::TooDeep {
                path: abs.display().to_string(),
                depth,
                limit: self.max_depth,
            });
        }
        Ok(abs)
    }

    pub fn validate_file(&self, raw: &str, must_exist: bool) -> ValidationResult<PathBuf> {
        let abs = self.resolve_checked(raw)?;
        if let Some(ext) = abs.extension().and_then(|e| e.to_str()) {
            if BLOCKED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                return Err(ValidationError::InvalidInput {
                    path: raw.to_string(),
                    reason: format!("file type not allowed: .{}", ext.to_ascii_lowercase()),
                });
            }
        }
        if must_exist {
            let meta = fs::metadata(&abs).map_err(|e| ValidationError::from_io(e, &abs))?;
            if !meta.is_file() {
                return Err(ValidationError::NotAFile {
                    path: abs.display().to_string(),
                });
            }
            if let Err(e) = fs::File::open(&abs) {
                return Err(ValidationError::from_io(e, &abs));
            }
            let limit = self.size_limit_for(&abs);
            if meta.len() > limit {
                return Err(ValidationError::TooLarge {
                    path: abs.display().to_string(),
                    size: meta.len(),
                    limit,
                });
            }
        }
        Ok(abs)
    }

    /// Sanitize, expand a leading home shortcut, resolve to an absolute
    /// canonical path, then run the traversal guard against the original
    /// string and the allowed root.
    fn resolve_checked(&self, raw: &str) -> ValidationResult<PathBuf> {
        if raw.trim().is_empty() {
            return Err(ValidationError::InvalidInput {
                path: raw.to_string(),
                reason: "path must be a non-empty string".to_string(),
            });
        }
        let sanitized = sanitize::sanitize(raw);
        if sanitized.is_empty() {
            return Err(ValidationError::InvalidInput {
                path: raw.to_string(),
                reason: "path is empty after sanitization".to_string(),
            });
        }
        let expanded = expand_home(&sanitized);
        let joined = self.absolutize(Path::new(&expanded))?;
        // Symlinks are resolved before the containment check, so a link
        // inside the root cannot reach outside it. For paths that do not
        // exist yet the deepest existing ancestor is canonicalized and the
        // remainder re-appended.
        let abs = canonicalize_lenient(&joined);
        match &self.allowed_root {
            Some(root) => guard::check(raw, &abs, root)?,
            None => guard::lexical_check(raw)?,
        }
        Ok(abs)
    }

    /// Relative inputs are resolved against the allowed root, never the
    /// process working directory.
    fn absolutize(&self, path: &Path) -> ValidationResult<PathBuf> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        match &self.allowed_root {
            Some(root) => Ok(root.join(path)),
            None => std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .map_err(|e| ValidationError::Internal(e.to_string())),
        }
    }

    fn size_limit_for(&self, path: &Path) -> u64 {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .and_then(|e| self.size_limits.get(&e).copied())
            .unwrap_or(self.max_file_size)
    }
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
            if let Ok(home) = std::env::var("HOME") {
                return format!("{home}{rest}");
            }
        }
    }
    path.to_string()
}

/// Canonicalize, falling back to canonicalizing the deepest existing
/// ancestor and re-appending the missing suffix when the full path does
/// not exist.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    if let Ok(c) = dunce::canonicalize(path) {
        return c;
    }
    let mut rest: Vec<std::ffi::OsString> = Vec::new();
    let mut cur = path.to_path_buf();
    loop {
        if let Ok(c) = dunce::canonicalize(&cur) {
            let mut out = c;
            for name in rest.iter().rev() {
                out.push(name);
            }
            return out;
        }
        match (cur.parent(), cur.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                cur = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}
