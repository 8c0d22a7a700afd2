use semver::Version;
use tracing::info;

use crate::{ChartRenderer, HelmError};

/// Oldest supported Helm major version
pub const MINIMUM_MAJOR_VERSION: u64 = 3;

/// Parse a version as printed by `helm version`, e.g. `v3.14.2+gc309b6f`.
pub fn parse_helm_version(raw: &str) -> Result<Version, HelmError> {
    let trimmed = raw.trim();
    let without_prefix = trimmed.strip_prefix('v').unwrap_or(trimmed);

    Version::parse(without_prefix).map_err(|source| HelmError::InvalidVersion {
        version: trimmed.to_string(),
        source,
    })
}

/// Query the renderer once and reject anything older than Helm 3.
pub async fn ensure_supported_version(renderer: &dyn ChartRenderer) -> Result<Version, HelmError> {
    let raw = renderer.version().await?;
    let version = parse_helm_version(&raw)?;

    if version.major < MINIMUM_MAJOR_VERSION {
        return Err(HelmError::UnsupportedVersion {
            minimum: MINIMUM_MAJOR_VERSION,
            found: version,
        });
    }

    info!(version = %version, "Using helm");
    Ok(version)
}
