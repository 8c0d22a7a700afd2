use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{command_line, CommandOutput, CommandRunner, ExecError};

/// Production [`CommandRunner`] that spawns real processes
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    /// Echo every invocation to stderr before running it
    debug: bool,
    /// Working directory for spawned processes (None = inherit)
    working_dir: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, working_dir: PathBuf) -> Self {
        self.working_dir = Some(working_dir);
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessExecutor {
    async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput, ExecError> {
        if self.debug {
            eprintln!(">>> {}", command_line(program, args));
        }

        let start = Instant::now();
        debug!(program, args = ?args, "Spawning process");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let raw = cmd.output().await.map_err(|source| ExecError::SpawnFailed {
            program: program.to_string(),
            args: args.to_vec(),
            source,
        })?;

        let output = CommandOutput::new(
            String::from_utf8_lossy(&raw.stdout).into_owned(),
            String::from_utf8_lossy(&raw.stderr).into_owned(),
            raw.status.code().unwrap_or(-1),
            start.elapsed(),
        );

        debug!(
            program,
            exit_code = output.exit_code,
            duration_ms = output.duration.as_millis(),
            "Process completed"
        );

        if !output.success() {
            return Err(ExecError::NonZeroExit {
                program: program.to_string(),
                args: args.to_vec(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_capture_trims_stdout() {
        let exec = ProcessExecutor::new(false);
        let out = exec.capture("sh", &sh("printf '  hello\\n\\n'")).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let exec = ProcessExecutor::new(false);
        let err = exec
            .run("sh", &sh("echo oops >&2; exit 3"))
            .await
            .unwrap_err();

        match err {
            ExecError::NonZeroExit {
                program,
                args,
                exit_code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(args.len(), 2);
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_carries_os_error() {
        let exec = ProcessExecutor::new(false);
        let err = exec
            .run("fluxdiff-definitely-not-a-binary", &["x".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::SpawnFailed { .. }));
        assert!(err.to_string().contains("fluxdiff-definitely-not-a-binary x"));
    }

    #[tokio::test]
    async fn test_working_dir_is_applied() {
        let dir = std::env::temp_dir();
        let exec = ProcessExecutor::new(false).with_working_dir(dir.clone());
        let out = exec.capture("pwd", &[]).await.unwrap();
        assert_eq!(
            std::fs::canonicalize(out).unwrap(),
            std::fs::canonicalize(dir).unwrap()
        );
    }
}
