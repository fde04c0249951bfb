use crate::scenario::StructureSummary;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Recursively walks a scenario directory and builds the structural
/// inventory. Unreadable subdirectories are skipped with a debug log so
/// the summary stays partial rather than failing.
pub fn analyze(root: &Path) -> StructureSummary {
    let mut summary = StructureSummary::default();
    walk(root, root, &mut summary);
    summary
}

fn walk(root: &Path, dir: &Path, summary: &mut StructureSummary) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let rel_str = rel.to_string_lossy().into_owned();
    let top_level = rel.as_os_str().is_empty();

    let mut subdirs = Vec::new();
    let mut file_names = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            subdirs.push((entry.path(), name));
        } else {
            file_names.push(name);
        }
    }

    if top_level {
        summary.files.extend(file_names.iter().cloned());
    } else {
        summary.directories.push(rel_str.clone());
        if rel_str.contains("Playfields") {
            summary.playfields_count += subdirs
                .iter()
                .filter(|(_, name)| !name.starts_with('.'))
                .count();
        } else if rel_str.contains("Prefabs") {
            summary.prefabs_count += file_names.iter().filter(|n| n.ends_with(".epb")).count();
        } else if rel_str.contains("Content") {
            summary.has_content = true;
            if file_names.iter().any(|n| n.ends_with(".ecf")) {
                summary.has_custom_configs = true;
            }
        }
    }

    for (path, _) in subdirs {
        walk(root, &path, summary);
    }
}
