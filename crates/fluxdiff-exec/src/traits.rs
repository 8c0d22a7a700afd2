use async_trait::async_trait;
use thiserror::Error;

use crate::CommandOutput;

/// Errors that can occur while running an external command
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn '{}': {source}", command_line(.program, .args))]
    SpawnFailed {
        program: String,
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' exited with code {exit_code}: {stderr}", command_line(.program, .args))]
    NonZeroExit {
        program: String,
        args: Vec<String>,
        exit_code: i32,
        stderr: String,
    },
}

/// Render a program and its arguments as a single shell-like line.
pub fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Runs external commands one at a time
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, failing on spawn errors and non-zero exits.
    async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput, ExecError>;

    /// Run a command where only success or failure matters
    async fn run(&self, program: &str, args: &[String]) -> Result<(), ExecError> {
        self.output(program, args).await.map(|_| ())
    }

    /// Run a command and return its stdout, trimmed
    async fn capture(&self, program: &str, args: &[String]) -> Result<String, ExecError> {
        Ok(self.output(program, args).await?.trimmed_stdout())
    }
}
