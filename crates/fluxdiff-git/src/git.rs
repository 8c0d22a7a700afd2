use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fluxdiff_exec::{CommandRunner, ExecError};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(#[source] ExecError),

    #[error("Git command failed: {0}")]
    CommandFailed(#[from] ExecError),

    #[error("Git diff failed: {0}")]
    DiffFailed(#[from] git2::Error),
}

/// Revision-control operations needed to compare two revisions
#[async_trait]
pub trait GitOps: Send + Sync {
    /// Fail unless the working directory is inside a git work tree
    async fn validate_repository(&self) -> Result<(), GitError>;

    /// Nearest common ancestor of two refs
    async fn merge_base(&self, commit1: &str, commit2: &str) -> Result<String, GitError>;

    /// Materialize `reference` at `path`, which must not exist yet
    async fn add_worktree(&self, path: &Path, reference: &str) -> Result<(), GitError>;

    /// Remove a worktree created by [`GitOps::add_worktree`]
    async fn remove_worktree(&self, path: &Path) -> Result<(), GitError>;

    /// Files differing between `commit` and the working tree, renames
    /// reported once under their new path
    async fn list_changed_files(&self, commit: &str) -> Result<Vec<PathBuf>, GitError>;

    /// Whether `file` exists at the tip of `remote/branch`
    async fn file_exists_on_branch(&self, file: &Path, remote: &str, branch: &str) -> bool;
}

/// [`GitOps`] backed by the `git` CLI
pub struct Git {
    exec: Arc<dyn CommandRunner>,
}

impl Git {
    pub fn new(exec: Arc<dyn CommandRunner>) -> Self {
        Self { exec }
    }

    /// Top-level directory of the work tree containing the working directory.
    ///
    /// Paths reported by git are relative to it.
    pub async fn repository_root(&self) -> Result<PathBuf, GitError> {
        let toplevel = self
            .capture(&["rev-parse", "--show-toplevel"])
            .await
            .map_err(GitError::NotARepo)?;
        debug!(root = %toplevel, "Resolved repository root");
        Ok(PathBuf::from(toplevel))
    }

    async fn capture(&self, args: &[&str]) -> Result<String, ExecError> {
        self.exec.capture("git", &to_args(args)).await
    }

    async fn run(&self, args: &[&str]) -> Result<(), ExecError> {
        self.exec.run("git", &to_args(args)).await
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl GitOps for Git {
    async fn validate_repository(&self) -> Result<(), GitError> {
        self.capture(&["rev-parse", "--is-inside-work-tree"])
            .await
            .map(|_| ())
            .map_err(GitError::NotARepo)
    }

    async fn merge_base(&self, commit1: &str, commit2: &str) -> Result<String, GitError> {
        let base = self.capture(&["merge-base", commit1, commit2]).await?;
        debug!(commit1, commit2, merge_base = %base, "Resolved merge base");
        Ok(base)
    }

    async fn add_worktree(&self, path: &Path, reference: &str) -> Result<(), GitError> {
        let path = path_arg(path);
        self.run(&["worktree", "add", "--detach", &path, reference])
            .await?;
        Ok(())
    }

    async fn remove_worktree(&self, path: &Path) -> Result<(), GitError> {
        let path = path_arg(path);
        self.run(&["worktree", "remove", "--force", &path]).await?;
        Ok(())
    }

    async fn list_changed_files(&self, commit: &str) -> Result<Vec<PathBuf>, GitError> {
        let output = self
            .capture(&["diff", "--find-renames", "--name-only", commit])
            .await?;

        let files: Vec<PathBuf> = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();

        debug!(commit, changed = files.len(), "Listed changed files");
        Ok(files)
    }

    async fn file_exists_on_branch(&self, file: &Path, remote: &str, branch: &str) -> bool {
        let spec = format!("{}/{}:{}", remote, branch, path_arg(file));
        self.capture(&["cat-file", "-e", &spec]).await.is_ok()
    }
}
