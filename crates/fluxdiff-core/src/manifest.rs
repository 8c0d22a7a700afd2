use std::path::{Path, PathBuf};

use fluxdiff_helm::RenderRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Release name used when a manifest has no `metadata.name`
const DEFAULT_RELEASE_NAME: &str = "release";

const HELM_RELEASE_KIND: &str = "HelmRelease";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse {} as a HelmRelease: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} holds no HelmRelease (found {kind})", .path.display())]
    NotAHelmRelease { path: PathBuf, kind: String },
}

/// A HelmRelease reduced to what rendering needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseManifest {
    /// File the release was read from; identity across revisions
    pub path: PathBuf,
    pub name: String,
    pub namespace: Option<String>,
    /// Name of the chart repository (`sourceRef.name`)
    pub chart_ref: String,
    pub chart_name: String,
    /// Empty when the release tracks the latest chart version
    pub chart_version: String,
    /// Passed through to rendering unmodified
    pub values: Option<Value>,
}

impl ReleaseManifest {
    /// Parse the HelmRelease read from `path`.
    ///
    /// In a multi-document file the first HelmRelease document is used.
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let parse_error = |source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mut kinds = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            let raw = serde_yaml::Value::deserialize(document).map_err(parse_error)?;
            if raw.is_null() {
                continue;
            }
            let kind = raw
                .get("kind")
                .and_then(serde_yaml::Value::as_str)
                .unwrap_or_default();
            if kind == HELM_RELEASE_KIND {
                let document: HelmReleaseDocument =
                    serde_yaml::from_value(raw).map_err(parse_error)?;
                return Ok(Self::from_document(path, document));
            }
            kinds.push(if kind.is_empty() {
                "document without kind".to_string()
            } else {
                kind.to_string()
            });
        }

        Err(ManifestError::NotAHelmRelease {
            path: path.to_path_buf(),
            kind: if kinds.is_empty() {
                "empty file".to_string()
            } else {
                kinds.join(", ")
            },
        })
    }

    fn from_document(path: &Path, document: HelmReleaseDocument) -> Self {
        let chart = document.spec.chart.spec;

        Self {
            path: path.to_path_buf(),
            name: document
                .metadata
                .name
                .unwrap_or_else(|| DEFAULT_RELEASE_NAME.to_string()),
            namespace: document.metadata.namespace,
            chart_ref: chart.source_ref.name,
            chart_name: chart.chart,
            chart_version: chart.version,
            values: document.spec.values,
        }
    }

    /// Borrow this release as a render request
    pub fn render_request(&self) -> RenderRequest<'_> {
        RenderRequest {
            manifest_path: &self.path,
            release_name: &self.name,
            namespace: self.namespace.as_deref(),
            values: self.values.as_ref(),
            chart_repo: &self.chart_ref,
            chart_name: &self.chart_name,
            chart_version: &self.chart_version,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HelmReleaseDocument {
    #[serde(default)]
    metadata: Metadata,
    spec: HelmReleaseSpec,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    name: Option<String>,
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelmReleaseSpec {
    chart: ChartTemplate,
    #[serde(default)]
    values: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartTemplate {
    spec: ChartSpec,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartSpec {
    chart: String,
    #[serde(default)]
    version: String,
    source_ref: SourceRef,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    name: String,
}

/// Reads release manifests from some file source
pub trait ManifestLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<ReleaseManifest, ManifestError>;
}

/// [`ManifestLoader`] reading paths relative to a root directory
pub struct FsManifestLoader {
    root: PathBuf,
}

impl FsManifestLoader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ManifestLoader for FsManifestLoader {
    fn load(&self, path: &Path) -> Result<ReleaseManifest, ManifestError> {
        let content =
            std::fs::read_to_string(self.root.join(path)).map_err(|source| ManifestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        ReleaseManifest::from_yaml(path, &content)
    }
}
