//! Configuration file support for fluxdiff.
//!
//! Settings come from `--config <file>` or `fluxdiff.toml` in the working
//! directory. Flags given on the command line override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fluxdiff_core::{
    parse_repo_extra_args, CandidateSelection, ChartRepo, ComparisonConfig,
};
use serde::{Deserialize, Serialize};

/// The config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "fluxdiff.toml";

/// Settings as written in the config file; every key is optional
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub remote: Option<String>,
    pub target_branch: Option<String>,
    pub since: Option<String>,
    pub chart_dirs: Option<Vec<String>>,
    pub excluded_charts: Option<Vec<String>>,
    pub all: Option<bool>,
    pub charts: Option<Vec<String>>,
    pub chart_repos: Option<Vec<String>>,
    pub helm_repo_extra_args: Option<Vec<String>>,
    pub helm_repo_default_args: Option<String>,
    pub helm_extra_args: Option<String>,
    pub helm_dependency_extra_args: Option<Vec<String>>,
    pub debug: Option<bool>,
}

impl FileConfig {
    /// Load the explicit config file, or `fluxdiff.toml` from `working_dir`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file was found and parsed
    /// - `Ok(None)` if no path was given and the default file does not exist
    /// - `Err(...)` if an explicit file is missing or any file fails to parse
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Option<Self>> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = working_dir.join(CONFIG_FILE_NAME);
                if !default.exists() {
                    return Ok(None);
                }
                default
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}

/// Effective configuration after merging flags, file and defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub remote: String,
    pub target_branch: String,
    pub since: String,
    pub chart_dirs: Vec<String>,
    pub excluded_charts: Vec<String>,
    pub all: bool,
    pub charts: Vec<String>,
    pub chart_repos: Vec<String>,
    pub helm_repo_extra_args: Vec<String>,
    pub helm_repo_default_args: String,
    pub helm_extra_args: String,
    pub helm_dependency_extra_args: Vec<String>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            target_branch: "master".to_string(),
            since: "HEAD".to_string(),
            chart_dirs: vec!["charts".to_string()],
            excluded_charts: Vec::new(),
            all: false,
            charts: Vec::new(),
            chart_repos: Vec::new(),
            helm_repo_extra_args: Vec::new(),
            helm_repo_default_args: String::new(),
            helm_extra_args: String::new(),
            helm_dependency_extra_args: Vec::new(),
            debug: false,
        }
    }
}

/// Values given on the command line; `None`/empty means "not given"
#[derive(Debug, Default)]
pub struct Overrides {
    pub remote: Option<String>,
    pub target_branch: Option<String>,
    pub since: Option<String>,
    pub chart_dirs: Vec<String>,
    pub excluded_charts: Vec<String>,
    pub all: bool,
    pub charts: Vec<String>,
    pub chart_repos: Vec<String>,
    pub helm_repo_extra_args: Vec<String>,
    pub helm_repo_default_args: Option<String>,
    pub helm_extra_args: Option<String>,
    pub helm_dependency_extra_args: Vec<String>,
    pub debug: bool,
}

fn pick_list(flag: Vec<String>, file: Option<Vec<String>>, default: Vec<String>) -> Vec<String> {
    if !flag.is_empty() {
        flag
    } else {
        file.unwrap_or(default)
    }
}

impl Config {
    /// Priority: command line > config file > defaults
    pub fn resolve(flags: Overrides, file: Option<FileConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Config::default();

        Self {
            remote: flags.remote.or(file.remote).unwrap_or(defaults.remote),
            target_branch: flags
                .target_branch
                .or(file.target_branch)
                .unwrap_or(defaults.target_branch),
            since: flags.since.or(file.since).unwrap_or(defaults.since),
            chart_dirs: pick_list(flags.chart_dirs, file.chart_dirs, defaults.chart_dirs),
            excluded_charts: pick_list(
                flags.excluded_charts,
                file.excluded_charts,
                defaults.excluded_charts,
            ),
            all: flags.all || file.all.unwrap_or(defaults.all),
            charts: pick_list(flags.charts, file.charts, defaults.charts),
            chart_repos: pick_list(flags.chart_repos, file.chart_repos, defaults.chart_repos),
            helm_repo_extra_args: pick_list(
                flags.helm_repo_extra_args,
                file.helm_repo_extra_args,
                defaults.helm_repo_extra_args,
            ),
            helm_repo_default_args: flags
                .helm_repo_default_args
                .or(file.helm_repo_default_args)
                .unwrap_or(defaults.helm_repo_default_args),
            helm_extra_args: flags
                .helm_extra_args
                .or(file.helm_extra_args)
                .unwrap_or(defaults.helm_extra_args),
            helm_dependency_extra_args: pick_list(
                flags.helm_dependency_extra_args,
                file.helm_dependency_extra_args,
                defaults.helm_dependency_extra_args,
            ),
            debug: flags.debug || file.debug.unwrap_or(defaults.debug),
        }
    }

    /// Arguments appended to every `helm template`
    pub fn helm_template_args(&self) -> Vec<String> {
        split_args(&self.helm_extra_args)
    }

    /// Settings for the comparison engine, rooted at `root_dir`
    pub fn comparison_config(&self, root_dir: PathBuf) -> Result<ComparisonConfig> {
        let chart_repos = self
            .chart_repos
            .iter()
            .map(|repo| repo.parse::<ChartRepo>())
            .collect::<Result<Vec<_>, _>>()?;
        let repo_extra_args = parse_repo_extra_args(&self.helm_repo_extra_args)?;

        // Explicit charts take precedence over --all
        let selection = if !self.charts.is_empty() {
            CandidateSelection::Explicit(self.charts.iter().map(PathBuf::from).collect())
        } else if self.all {
            CandidateSelection::All
        } else {
            CandidateSelection::Changed
        };

        Ok(ComparisonConfig {
            remote: self.remote.clone(),
            target_branch: self.target_branch.clone(),
            since: self.since.clone(),
            chart_dirs: self.chart_dirs.iter().map(PathBuf::from).collect(),
            excluded_charts: self.excluded_charts.clone(),
            selection,
            chart_repos,
            repo_default_args: split_args(&self.helm_repo_default_args),
            repo_extra_args,
            root_dir,
            worktree_parent: PathBuf::from("."),
        })
    }

    /// TOML dump for `--print-config`
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}
