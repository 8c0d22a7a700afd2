//! # fluxdiff-core
//!
//! Detects HelmRelease manifests that changed between two revisions and
//! renders both versions to produce a per-release diff.
//!
//! ## Overview
//!
//! [`ComparisonEngine::compute_changed_releases`] is the single entry point:
//!
//! 1. Validate the repository and resolve the merge base of
//!    `remote/target-branch` and `since`
//! 2. Stage the merge base in a temporary worktree (always removed)
//! 3. Load every candidate manifest from the current tree
//! 4. Pair each with its counterpart in the worktree, skipping new charts
//! 5. Render both through Helm and diff the output
//!
//! Manifest load failures skip that one file. Render failures abort the run.
//!
//! ## Key Types
//!
//! - [`ComparisonEngine`] - the orchestrator
//! - [`ComparisonConfig`] - remote, branches, candidate selection, repositories
//! - [`ReleaseManifest`] / [`ManifestLoader`] - the release model and how it is read
//! - [`DiffResult`] - one per changed release with a prior version

mod config;
mod discovery;
mod engine;
mod error;
mod manifest;
mod paths;
mod repos;
mod result;

pub use config::{CandidateSelection, ComparisonConfig};
pub use discovery::{find_manifests, is_under_chart_dirs};
pub use engine::{ComparisonEngine, WORKTREE_PREFIX};
pub use error::ComparisonError;
pub use manifest::{FsManifestLoader, ManifestError, ManifestLoader, ReleaseManifest};
pub use paths::{relativize, PathError};
pub use repos::{
    merge_extra_args, parse_repo_extra_args, plan_registrations, ChartRepo, RepoArgError,
    RepoRegistration,
};
pub use result::DiffResult;
