use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("{} is not located under {}", .path.display(), .root.display())]
    NotUnderRoot { path: PathBuf, root: PathBuf },
}

/// Drop `.` components so `./a/b` and `a/b` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Strip `root` from `path` by whole components.
///
/// `path` must name something strictly below `root`; anything else,
/// including `root` itself, is [`PathError::NotUnderRoot`].
pub fn relativize(path: &Path, root: &Path) -> Result<PathBuf, PathError> {
    let not_under_root = || PathError::NotUnderRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };

    let normalized_path = normalize(path);
    let normalized_root = normalize(root);

    let relative = normalized_path
        .strip_prefix(&normalized_root)
        .map_err(|_| not_under_root())?;

    if relative.as_os_str().is_empty() {
        return Err(not_under_root());
    }

    Ok(relative.to_path_buf())
}
