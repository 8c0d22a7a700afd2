use serde::Serialize;

use crate::ReleaseManifest;

/// Rendered difference between two revisions of one release
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub new_manifest: ReleaseManifest,
    pub old_manifest: ReleaseManifest,
    /// Unified diff of the rendered output; empty when renders are identical
    pub diff: String,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        !self.diff.is_empty()
    }
}
