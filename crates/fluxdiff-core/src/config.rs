use std::collections::HashMap;
use std::path::PathBuf;

use crate::ChartRepo;

/// Which files are considered for comparison
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CandidateSelection {
    /// Files changed since the merge base, limited to the chart directories
    #[default]
    Changed,
    /// Every YAML file below the chart directories
    All,
    /// Exactly these files, in this order
    Explicit(Vec<PathBuf>),
}

/// Settings for one comparison run
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    pub remote: String,
    pub target_branch: String,
    /// Git reference compared against the target branch
    pub since: String,
    /// Directories containing release manifests (empty = whole repository)
    pub chart_dirs: Vec<PathBuf>,
    /// Chart names to skip
    pub excluded_charts: Vec<String>,
    pub selection: CandidateSelection,
    pub chart_repos: Vec<ChartRepo>,
    /// `helm repo add` arguments applied to every repository
    pub repo_default_args: Vec<String>,
    /// `helm repo add` arguments per repository name
    pub repo_extra_args: HashMap<String, Vec<String>>,
    /// Repository root used for chart directory discovery
    pub root_dir: PathBuf,
    /// Where the previous-revision worktree is created
    pub worktree_parent: PathBuf,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            target_branch: "master".to_string(),
            since: "HEAD".to_string(),
            chart_dirs: vec![PathBuf::from("charts")],
            excluded_charts: Vec::new(),
            selection: CandidateSelection::Changed,
            chart_repos: Vec::new(),
            repo_default_args: Vec::new(),
            repo_extra_args: HashMap::new(),
            root_dir: PathBuf::from("."),
            worktree_parent: PathBuf::from("."),
        }
    }
}

impl ComparisonConfig {
    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = branch.into();
        self
    }

    pub fn with_chart_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.chart_dirs = dirs;
        self
    }

    pub fn with_selection(mut self, selection: CandidateSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_root_dir(mut self, root_dir: PathBuf) -> Self {
        self.root_dir = root_dir;
        self
    }

    pub fn with_worktree_parent(mut self, parent: PathBuf) -> Self {
        self.worktree_parent = parent;
        self
    }

    /// `remote/target-branch`, the ref the merge base is computed against
    pub fn target_ref(&self) -> String {
        format!("{}/{}", self.remote, self.target_branch)
    }

    pub fn is_excluded(&self, chart_name: &str) -> bool {
        self.excluded_charts.iter().any(|c| c == chart_name)
    }
}
