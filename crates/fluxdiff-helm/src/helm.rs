use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use fluxdiff_exec::{CommandRunner, ExecError};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HelmError {
    #[error("Helm command failed: {0}")]
    CommandFailed(#[from] ExecError),

    #[error("Could not prepare values file for helm template: {0}")]
    ValuesFile(#[from] std::io::Error),

    #[error("Could not serialize values: {0}")]
    ValuesEncoding(#[from] serde_json::Error),

    #[error("Could not parse helm version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Minimum required Helm version is v{minimum}.0.0; found: {found}")]
    UnsupportedVersion { minimum: u64, found: semver::Version },
}

/// A single release to render
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Manifest the release came from (for logging)
    pub manifest_path: &'a Path,
    pub release_name: &'a str,
    pub namespace: Option<&'a str>,
    /// Opaque values payload, passed through unmodified
    pub values: Option<&'a Value>,
    /// Registered repository name
    pub chart_repo: &'a str,
    pub chart_name: &'a str,
    pub chart_version: &'a str,
}

/// Chart template rendering and repository registration
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Register a chart repository under `name`
    async fn add_repository(
        &self,
        name: &str,
        url: &str,
        extra_args: &[String],
    ) -> Result<(), HelmError>;

    /// Render the chart pinned at the requested version with its values
    async fn template_with_values(&self, request: &RenderRequest<'_>)
        -> Result<String, HelmError>;

    /// Version string reported by the renderer
    async fn version(&self) -> Result<String, HelmError>;
}

/// [`ChartRenderer`] backed by the `helm` CLI
pub struct Helm {
    exec: Arc<dyn CommandRunner>,
    /// Appended to every `helm template` invocation
    extra_args: Vec<String>,
}

impl Helm {
    pub fn new(exec: Arc<dyn CommandRunner>) -> Self {
        Self {
            exec,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }
}

#[async_trait]
impl ChartRenderer for Helm {
    async fn add_repository(
        &self,
        name: &str,
        url: &str,
        extra_args: &[String],
    ) -> Result<(), HelmError> {
        debug!(name, url, extra_args = extra_args.len(), "Adding helm repository");

        let mut args = vec![
            "repo".to_string(),
            "add".to_string(),
            name.to_string(),
            url.to_string(),
        ];
        args.extend(extra_args.iter().cloned());

        self.exec.run("helm", &args).await?;
        Ok(())
    }

    async fn template_with_values(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<String, HelmError> {
        // Removed on drop, on every return path below
        let dir = tempfile::Builder::new()
            .prefix("fluxdiff-template")
            .tempdir()?;
        let values_file = dir.path().join("values.json");

        let payload = match request.values {
            Some(values) => serde_json::to_vec(values)?,
            None => b"{}".to_vec(),
        };
        tokio::fs::write(&values_file, payload).await?;

        let mut args = vec![
            "template".to_string(),
            request.release_name.to_string(),
            format!("{}/{}", request.chart_repo, request.chart_name),
            "-f".to_string(),
            values_file.to_string_lossy().into_owned(),
        ];
        // No version renders the latest chart
        if !request.chart_version.is_empty() {
            args.push("--version".to_string());
            args.push(request.chart_version.to_string());
        }
        if let Some(namespace) = request.namespace {
            args.push("--namespace".to_string());
            args.push(namespace.to_string());
        }
        args.extend(self.extra_args.iter().cloned());

        debug!(
            manifest = %request.manifest_path.display(),
            chart = %format!("{}/{}", request.chart_repo, request.chart_name),
            version = request.chart_version,
            "Rendering chart"
        );

        let rendered = self.exec.capture("helm", &args).await?;
        Ok(rendered)
    }

    async fn version(&self) -> Result<String, HelmError> {
        let args = vec![
            "version".to_string(),
            "--template".to_string(),
            "{{ .Version }}".to_string(),
        ];
        Ok(self.exec.capture("helm", &args).await?)
    }
}
