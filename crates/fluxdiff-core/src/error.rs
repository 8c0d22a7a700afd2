use std::path::PathBuf;

use fluxdiff_git::GitError;
use fluxdiff_helm::HelmError;
use thiserror::Error;

use crate::PathError;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Must be in a git repository: {0}")]
    InvalidRepository(#[source] GitError),

    #[error("Could not compute merge base of {target} and {since}: {source}")]
    MergeBase {
        target: String,
        since: String,
        #[source]
        source: GitError,
    },

    #[error("Could not create worktree for previous revision at {}: {source}", .path.display())]
    Worktree {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    #[error("Failed listing changed files: {0}")]
    ListChangedFiles(#[source] GitError),

    #[error("Failed discovering release manifests: {0}")]
    Discovery(#[from] ignore::Error),

    #[error("Failed adding repo {name}={url}: {source}")]
    RepoRegistration {
        name: String,
        url: String,
        #[source]
        source: HelmError,
    },

    #[error("Failed rendering {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: HelmError,
    },

    #[error("Failed computing diff for {}: {source}", .path.display())]
    Diff {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}
