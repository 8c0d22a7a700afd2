//! In-memory fakes for the comparison engine's capabilities.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fluxdiff_exec::ExecError;
use fluxdiff_git::{GitError, GitOps};
use fluxdiff_helm::{ChartRenderer, HelmError, RenderRequest};
use tracing_subscriber::fmt::MakeWriter;

fn exec_failure(program: &str, stderr: &str) -> ExecError {
    ExecError::NonZeroExit {
        program: program.to_string(),
        args: Vec::new(),
        exit_code: 1,
        stderr: stderr.to_string(),
    }
}

/// A HelmRelease manifest for chart `podinfo` from repository `podinfo`.
pub fn helm_release(name: &str, version: &str, replicas: u32) -> String {
    format!(
        "apiVersion: helm.toolkit.fluxcd.io/v2beta1
kind: HelmRelease
metadata:
  name: {name}
  namespace: apps
spec:
  chart:
    spec:
      chart: podinfo
      version: \"{version}\"
      sourceRef:
        kind: HelmRepository
        name: podinfo
  values:
    replicaCount: {replicas}
"
    )
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Git fake: the merge-base tree is `old_files`, materialized under `root`
/// when a worktree is added.
pub struct FakeGit {
    pub root: PathBuf,
    pub valid_repo: bool,
    pub merge_base_fails: bool,
    pub add_worktree_fails: bool,
    pub changed: Vec<PathBuf>,
    pub old_files: HashMap<PathBuf, String>,
    pub on_target_branch: HashSet<PathBuf>,
    pub calls: Mutex<Vec<String>>,
    pub existence_checks: Mutex<Vec<(PathBuf, String, String)>>,
    pub worktrees_added: Mutex<Vec<PathBuf>>,
    pub worktrees_removed: Mutex<Vec<PathBuf>>,
}

impl FakeGit {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            valid_repo: true,
            merge_base_fails: false,
            add_worktree_fails: false,
            changed: Vec::new(),
            old_files: HashMap::new(),
            on_target_branch: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            existence_checks: Mutex::new(Vec::new()),
            worktrees_added: Mutex::new(Vec::new()),
            worktrees_removed: Mutex::new(Vec::new()),
        }
    }

    pub fn changed(mut self, files: &[&str]) -> Self {
        self.changed = files.iter().map(PathBuf::from).collect();
        self
    }

    /// A file present both at the merge base and on the target branch tip
    pub fn previous(mut self, path: &str, content: &str) -> Self {
        self.old_files.insert(PathBuf::from(path), content.to_string());
        self.on_target_branch.insert(PathBuf::from(path));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl GitOps for FakeGit {
    async fn validate_repository(&self) -> Result<(), GitError> {
        self.record("validate_repository");
        if self.valid_repo {
            Ok(())
        } else {
            Err(GitError::NotARepo(exec_failure("git", "not a git repository")))
        }
    }

    async fn merge_base(&self, commit1: &str, commit2: &str) -> Result<String, GitError> {
        self.record(&format!("merge_base {commit1} {commit2}"));
        if self.merge_base_fails {
            return Err(GitError::CommandFailed(exec_failure("git", "no merge base")));
        }
        Ok("base123".to_string())
    }

    async fn add_worktree(&self, path: &Path, reference: &str) -> Result<(), GitError> {
        self.record(&format!("add_worktree {reference}"));
        if self.add_worktree_fails {
            return Err(GitError::CommandFailed(exec_failure("git", "invalid reference")));
        }
        let dir = self.root.join(path);
        assert!(!dir.exists(), "worktree path must not exist beforehand");
        fs::create_dir_all(&dir).unwrap();
        for (file, content) in &self.old_files {
            let target = dir.join(file);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, content).unwrap();
        }
        self.worktrees_added.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn remove_worktree(&self, path: &Path) -> Result<(), GitError> {
        self.record("remove_worktree");
        let _ = fs::remove_dir_all(self.root.join(path));
        self.worktrees_removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn list_changed_files(&self, commit: &str) -> Result<Vec<PathBuf>, GitError> {
        self.record(&format!("list_changed_files {commit}"));
        Ok(self.changed.clone())
    }

    async fn file_exists_on_branch(&self, file: &Path, remote: &str, branch: &str) -> bool {
        self.existence_checks.lock().unwrap().push((
            file.to_path_buf(),
            remote.to_string(),
            branch.to_string(),
        ));
        self.on_target_branch.contains(file)
    }
}

/// Renderer fake: output is a deterministic function of the request.
#[derive(Default)]
pub struct FakeRenderer {
    /// Fail rendering any release pinned at this chart version
    pub fail_on_version: Option<String>,
    pub fail_add_repository: bool,
    /// Render every request to this text instead
    pub fixed_output: Option<String>,
    pub events: Mutex<Vec<String>>,
    pub repositories: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl FakeRenderer {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartRenderer for FakeRenderer {
    async fn add_repository(
        &self,
        name: &str,
        url: &str,
        extra_args: &[String],
    ) -> Result<(), HelmError> {
        self.events.lock().unwrap().push(format!("add_repository {name}"));
        if self.fail_add_repository {
            return Err(HelmError::CommandFailed(exec_failure("helm", "401 unauthorized")));
        }
        self.repositories.lock().unwrap().push((
            name.to_string(),
            url.to_string(),
            extra_args.to_vec(),
        ));
        Ok(())
    }

    async fn template_with_values(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<String, HelmError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("template {}", request.chart_version));

        if self.fail_on_version.as_deref() == Some(request.chart_version) {
            return Err(HelmError::CommandFailed(exec_failure("helm", "chart not found")));
        }
        if let Some(ref fixed) = self.fixed_output {
            return Ok(fixed.clone());
        }

        let values = request
            .values
            .map(|v| v.to_string())
            .unwrap_or_else(|| "{}".to_string());
        Ok(format!(
            "release: {}\nchart: {}/{}\nversion: {}\nvalues: {}\n",
            request.release_name,
            request.chart_repo,
            request.chart_name,
            request.chart_version,
            values
        ))
    }

    async fn version(&self) -> Result<String, HelmError> {
        Ok("v3.14.2".to_string())
    }
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Number of log lines containing every needle
    pub fn count_lines(&self, needles: &[&str]) -> usize {
        self.contents()
            .lines()
            .filter(|line| needles.iter().all(|n| line.contains(n)))
            .count()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's tracing output into a fresh buffer.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
