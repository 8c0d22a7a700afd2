use std::fmt;
use std::path::{Path, PathBuf};

use fluxdiff_git::{unified_diff, GitOps};
use fluxdiff_helm::ChartRenderer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::discovery::{find_manifests, is_under_chart_dirs};
use crate::repos::plan_registrations;
use crate::{
    relativize, CandidateSelection, ComparisonConfig, ComparisonError, DiffResult,
    ManifestLoader, ReleaseManifest,
};

/// Directory name prefix of the previous-revision worktree
pub const WORKTREE_PREFIX: &str = "ft_previous_revision";

/// Why a candidate file produced no diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    LoadFailed,
    PreviousLoadFailed,
    NewChart,
    Excluded,
    AbsolutePath,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LoadFailed => write!(f, "unreadable"),
            SkipReason::PreviousLoadFailed => write!(f, "previous revision unreadable"),
            SkipReason::NewChart => write!(f, "new chart"),
            SkipReason::Excluded => write!(f, "excluded"),
            SkipReason::AbsolutePath => write!(f, "outside repository"),
        }
    }
}

#[derive(Debug)]
struct SkippedFile {
    path: PathBuf,
    reason: SkipReason,
}

/// Compares HelmReleases between the merge base and the working tree
pub struct ComparisonEngine<'a> {
    config: ComparisonConfig,
    git: &'a dyn GitOps,
    renderer: &'a dyn ChartRenderer,
    loader: &'a dyn ManifestLoader,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(
        config: ComparisonConfig,
        git: &'a dyn GitOps,
        renderer: &'a dyn ChartRenderer,
        loader: &'a dyn ManifestLoader,
    ) -> Self {
        Self {
            config,
            git,
            renderer,
            loader,
        }
    }

    /// Diff every changed release that has a previous version.
    ///
    /// Results follow the order in which candidate files were enumerated.
    /// The worktree is removed before returning whenever it was created.
    pub async fn compute_changed_releases(&self) -> Result<Vec<DiffResult>, ComparisonError> {
        self.git
            .validate_repository()
            .await
            .map_err(ComparisonError::InvalidRepository)?;

        let target = self.config.target_ref();
        let merge_base = self
            .git
            .merge_base(&target, &self.config.since)
            .await
            .map_err(|source| ComparisonError::MergeBase {
                target: target.clone(),
                since: self.config.since.clone(),
                source,
            })?;
        info!(
            target = %target,
            since = %self.config.since,
            merge_base = %merge_base,
            "Resolved merge base"
        );

        let worktree = self.config.worktree_parent.join(format!(
            "{}-{}",
            WORKTREE_PREFIX,
            Uuid::new_v4().simple()
        ));
        self.git
            .add_worktree(&worktree, &merge_base)
            .await
            .map_err(|source| ComparisonError::Worktree {
                path: worktree.clone(),
                source,
            })?;
        debug!(worktree = %worktree.display(), "Created previous revision worktree");

        let result = self.compare_revisions(&merge_base, &worktree).await;

        if let Err(e) = self.git.remove_worktree(&worktree).await {
            warn!(worktree = %worktree.display(), error = %e, "Failed to remove worktree");
        }

        result
    }

    async fn compare_revisions(
        &self,
        merge_base: &str,
        worktree: &Path,
    ) -> Result<Vec<DiffResult>, ComparisonError> {
        let mut skipped = Vec::new();

        let candidates = self.candidate_files(merge_base).await?;
        let current = self.load_current(candidates, &mut skipped);

        self.register_repositories().await?;

        let mut results = Vec::new();
        if current.is_empty() {
            info!("No HelmReleases to compare");
        }
        for new in current {
            let Some(old) = self.load_previous(&new, worktree, &mut skipped).await? else {
                continue;
            };
            results.push(self.diff_pair(old, new).await?);
        }

        if !skipped.is_empty() {
            let excluded: Vec<String> = skipped
                .iter()
                .map(|s| format!("{} ({})", s.path.display(), s.reason))
                .collect();
            info!(count = skipped.len(), files = ?excluded, "Files excluded from diff");
        }

        info!(results = results.len(), "Finished comparing HelmReleases");
        Ok(results)
    }

    async fn candidate_files(&self, merge_base: &str) -> Result<Vec<PathBuf>, ComparisonError> {
        let files = match &self.config.selection {
            CandidateSelection::Changed => {
                let changed = self
                    .git
                    .list_changed_files(merge_base)
                    .await
                    .map_err(ComparisonError::ListChangedFiles)?;

                changed
                    .into_iter()
                    .filter(|path| {
                        let keep = is_under_chart_dirs(path, &self.config.chart_dirs);
                        if !keep {
                            debug!(path = %path.display(), "Outside chart directories");
                        }
                        keep
                    })
                    .collect()
            }
            CandidateSelection::All => {
                find_manifests(&self.config.root_dir, &self.config.chart_dirs)?
            }
            CandidateSelection::Explicit(paths) => paths.clone(),
        };

        let listed: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        info!(count = files.len(), files = ?listed, "Candidate HelmRelease files");
        Ok(files)
    }

    /// Load current-tree manifests, skipping unreadable and excluded ones.
    fn load_current(
        &self,
        candidates: Vec<PathBuf>,
        skipped: &mut Vec<SkippedFile>,
    ) -> Vec<ReleaseManifest> {
        let mut loaded = Vec::new();

        for path in candidates {
            match self.loader.load(&path) {
                Ok(manifest) if self.config.is_excluded(&manifest.chart_name) => {
                    info!(path = %path.display(), chart = %manifest.chart_name, "Chart excluded");
                    skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::Excluded,
                    });
                }
                Ok(manifest) => loaded.push(manifest),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load release manifest");
                    skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::LoadFailed,
                    });
                }
            }
        }

        loaded
    }

    async fn register_repositories(&self) -> Result<(), ComparisonError> {
        let plan = plan_registrations(
            &self.config.chart_repos,
            &self.config.repo_default_args,
            &self.config.repo_extra_args,
        );

        for repo in plan {
            self.renderer
                .add_repository(&repo.name, &repo.url, &repo.extra_args)
                .await
                .map_err(|source| ComparisonError::RepoRegistration {
                    name: repo.name.clone(),
                    url: repo.url.clone(),
                    source,
                })?;
            debug!(name = %repo.name, "Registered chart repository");
        }

        Ok(())
    }

    /// Counterpart of `new` in the previous revision, if there is one.
    ///
    /// Existence is checked on the tip of the target branch while content is
    /// read from the merge-base worktree.
    async fn load_previous(
        &self,
        new: &ReleaseManifest,
        worktree: &Path,
        skipped: &mut Vec<SkippedFile>,
    ) -> Result<Option<ReleaseManifest>, ComparisonError> {
        if new.path.is_absolute() {
            warn!(
                path = %new.path.display(),
                "Release path must be relative to the repository root"
            );
            skipped.push(SkippedFile {
                path: new.path.clone(),
                reason: SkipReason::AbsolutePath,
            });
            return Ok(None);
        }

        let previous_path = worktree.join(&new.path);
        let branch_path = relativize(&previous_path, worktree)?;

        let exists = self
            .git
            .file_exists_on_branch(&branch_path, &self.config.remote, &self.config.target_branch)
            .await;
        if !exists {
            info!(
                path = %new.path.display(),
                target_branch = %self.config.target_branch,
                "New chart detected, skipping diff"
            );
            skipped.push(SkippedFile {
                path: new.path.clone(),
                reason: SkipReason::NewChart,
            });
            return Ok(None);
        }

        match self.loader.load(&previous_path) {
            Ok(old) => Ok(Some(old)),
            Err(e) => {
                warn!(
                    path = %previous_path.display(),
                    error = %e,
                    "Failed to load release manifest"
                );
                skipped.push(SkippedFile {
                    path: new.path.clone(),
                    reason: SkipReason::PreviousLoadFailed,
                });
                Ok(None)
            }
        }
    }

    async fn render(&self, manifest: &ReleaseManifest) -> Result<String, ComparisonError> {
        self.renderer
            .template_with_values(&manifest.render_request())
            .await
            .map_err(|source| ComparisonError::Render {
                path: manifest.path.clone(),
                source,
            })
    }

    async fn diff_pair(
        &self,
        old: ReleaseManifest,
        new: ReleaseManifest,
    ) -> Result<DiffResult, ComparisonError> {
        let old_rendered = self.render(&old).await?;
        let new_rendered = self.render(&new).await?;

        let diff = unified_diff(&new.path, &old_rendered, &new_rendered).map_err(|source| {
            ComparisonError::Diff {
                path: new.path.clone(),
                source,
            }
        })?;

        info!(
            path = %new.path.display(),
            old_version = %old.chart_version,
            new_version = %new.chart_version,
            changed = !diff.is_empty(),
            "Compared HelmRelease"
        );

        Ok(DiffResult {
            new_manifest: new,
            old_manifest: old,
            diff,
        })
    }
}
