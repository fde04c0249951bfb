use crate::config::Manifest;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Cheap, non-throwing scenario check. Runs once per entry while listing a
/// directory tree, so every failure mode is a `false` with a low-severity
/// log line, never an error.
pub fn is_valid_scenario(manifest: &Manifest, max_file_size: u64, dir: &Path) -> bool {
    let meta = match fs::metadata(dir) {
        Ok(m) => m,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "scenario probe: cannot stat");
            return false;
        }
    };
    if !meta.is_dir() {
        debug!(path = %dir.display(), "scenario probe: not a directory");
        return false;
    }
    if fs::read_dir(dir).is_err() {
        debug!(path = %dir.display(), "scenario probe: directory not readable");
        return false;
    }

    for required in &manifest.required {
        let file = dir.join(required);
        let fmeta = match fs::metadata(&file) {
            Ok(m) => m,
            Err(_) => {
                debug!(path = %dir.display(), file = %required, "scenario probe: required file missing");
                return false;
            }
        };
        if !fmeta.is_file() {
            debug!(path = %dir.display(), file = %required, "scenario probe: required entry is not a file");
            return false;
        }
        if fs::File::open(&file).is_err() {
            debug!(path = %dir.display(), file = %required, "scenario probe: required file not readable");
            return false;
        }
        let limit = manifest.size_limit(required, max_file_size);
        if fmeta.len() > limit {
            warn!(
                path = %dir.display(),
                file = %required,
                size = fmeta.len(),
                limit,
                "scenario probe: required file too large"
            );
            return false;
        }
    }

    // Minimal parseability probe: the options file must have some
    // non-whitespace in its first kilobyte. Rejects empty or truncated
    // files without paying for a full parse.
    if !probe_nonempty(&dir.join(&manifest.options_file)) {
        debug!(path = %dir.display(), "scenario probe: options file empty or unreadable");
        return false;
    }

    true
}

fn probe_nonempty(path: &Path) -> bool {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let mut head = Vec::with_capacity(1024);
    if file.take(1024).read_to_end(&mut head).is_err() {
        return false;
    }
    head.iter().any(|b| !b.is_ascii_whitespace())
}
