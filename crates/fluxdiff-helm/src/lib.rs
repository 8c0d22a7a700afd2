//! # fluxdiff-helm
//!
//! Chart rendering through the `helm` CLI.
//!
//! ## Key Types
//!
//! - [`ChartRenderer`] - rendering capability used by the comparison engine
//! - [`Helm`] - production adapter (`helm repo add`, `helm template`, `helm version`)
//! - [`RenderRequest`] - everything needed to render one release
//!
//! Values are written to a private temporary directory for each render and
//! removed when the render returns, whether it succeeded or not.

mod helm;
mod version;

pub use helm::{ChartRenderer, Helm, HelmError, RenderRequest};
pub use version::{ensure_supported_version, parse_helm_version, MINIMUM_MAJOR_VERSION};
