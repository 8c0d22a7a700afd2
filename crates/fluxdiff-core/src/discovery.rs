use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::relativize;

/// Whether `path` lies under one of `chart_dirs`; an empty list matches all.
pub fn is_under_chart_dirs(path: &Path, chart_dirs: &[PathBuf]) -> bool {
    chart_dirs.is_empty() || chart_dirs.iter().any(|dir| relativize(path, dir).is_ok())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Every YAML file below `chart_dirs`, relative to `root`, sorted.
///
/// Honors `.gitignore`. Missing directories are skipped with a warning.
pub fn find_manifests(root: &Path, chart_dirs: &[PathBuf]) -> Result<Vec<PathBuf>, ignore::Error> {
    let mut found = Vec::new();

    for dir in chart_dirs {
        let walk_root = root.join(dir);
        if !walk_root.is_dir() {
            warn!(dir = %dir.display(), "Chart directory does not exist");
            continue;
        }

        for entry in WalkBuilder::new(&walk_root).build() {
            let entry = entry?;
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if !is_file || !is_yaml(entry.path()) {
                continue;
            }
            if let Ok(relative) = relativize(entry.path(), root) {
                found.push(relative);
            }
        }
    }

    found.sort();
    found.dedup();
    debug!(count = found.len(), "Discovered release manifests");
    Ok(found)
}
