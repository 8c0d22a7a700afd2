//! # fluxdiff-git
//!
//! Revision-control operations for fluxdiff.
//!
//! ## Key Types
//!
//! - [`GitOps`] - the capability the comparison engine depends on
//! - [`Git`] - production adapter that shells out to the `git` CLI
//! - [`unified_diff`] - line diff of two rendered manifests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fluxdiff_exec::ProcessExecutor;
//! use fluxdiff_git::{Git, GitOps};
//!
//! let git = Git::new(Arc::new(ProcessExecutor::new(false)));
//! git.validate_repository().await?;
//! let base = git.merge_base("origin/master", "HEAD").await?;
//! let changed = git.list_changed_files(&base).await?;
//! ```

mod diff;
mod git;

pub use diff::unified_diff;
pub use git::{Git, GitError, GitOps};
