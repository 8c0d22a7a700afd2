use std::borrow::Cow;
use std::path::Path;

use git2::{DiffOptions, Patch};
use tracing::debug;

use crate::GitError;

/// Unified line diff between two texts, labelled with `path`.
///
/// Identical inputs produce an empty string.
pub fn unified_diff(path: &Path, old: &str, new: &str) -> Result<String, GitError> {
    let old = with_trailing_newline(old);
    let new = with_trailing_newline(new);
    if old == new {
        return Ok(String::new());
    }

    let mut opts = DiffOptions::new();
    opts.context_lines(3);

    let mut patch = Patch::from_buffers(
        old.as_bytes(),
        Some(path),
        new.as_bytes(),
        Some(path),
        Some(&mut opts),
    )?;
    let buf = patch.to_buf()?;
    let diff_text = String::from_utf8_lossy(&buf).into_owned();

    debug!(path = %path.display(), diff_len = diff_text.len(), "Computed rendered diff");

    Ok(diff_text)
}

/// Renders arrive trimmed; restore the final newline so a changed last line
/// is not marked as missing one.
fn with_trailing_newline(text: &str) -> Cow<'_, str> {
    if text.is_empty() || text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_produce_empty_diff() {
        let text = "kind: Deployment\nreplicas: 1\n";
        let diff = unified_diff(Path::new("release.yaml"), text, text).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn test_changed_line_shows_as_removal_and_addition() {
        let old = "kind: Deployment\nimage: podinfo:1.0.0\nreplicas: 1\n";
        let new = "kind: Deployment\nimage: podinfo:1.1.0\nreplicas: 1\n";
        let diff = unified_diff(Path::new("apps/podinfo.yaml"), old, new).unwrap();

        assert!(diff.contains("@@"));
        assert!(diff.contains("-image: podinfo:1.0.0"));
        assert!(diff.contains("+image: podinfo:1.1.0"));
        assert!(diff.contains("apps/podinfo.yaml"));
        assert!(!diff.contains("-replicas: 1"));
    }

    #[test]
    fn test_trimmed_renders_do_not_report_missing_newline() {
        let old = "kind: Deployment\nversion: 1.0.0";
        let new = "kind: Deployment\nversion: 1.1.0";
        let diff = unified_diff(Path::new("apps/podinfo.yaml"), old, new).unwrap();

        assert!(diff.contains("-version: 1.0.0\n+version: 1.1.0\n"));
        assert!(!diff.contains("No newline at end of file"));
    }

    #[test]
    fn test_empty_side_diffs_as_full_addition() {
        let diff = unified_diff(Path::new("new.yaml"), "", "kind: Service").unwrap();
        assert!(diff.contains("+kind: Service"));
        assert!(!diff.contains("No newline at end of file"));
    }
}
