//! # fluxdiff-exec
//!
//! Blocking-in-sequence execution of external tools (`git`, `helm`).
//!
//! Every adapter in fluxdiff talks to its tool through the [`CommandRunner`]
//! trait, so tests can substitute a recording fake for [`ProcessExecutor`].
//!
//! ## Result modes
//!
//! - [`CommandRunner::run`] - only success or failure matters
//! - [`CommandRunner::capture`] - stdout as a trimmed string
//!
//! Invocations are never retried. A non-zero exit or a spawn failure is an
//! [`ExecError`] naming the program and its arguments.

mod executor;
mod output;
mod traits;

pub use executor::ProcessExecutor;
pub use output::CommandOutput;
pub use traits::{command_line, CommandRunner, ExecError};
