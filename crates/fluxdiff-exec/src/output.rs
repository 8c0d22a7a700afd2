use std::time::Duration;

/// Output captured from an external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Raw stdout
    pub stdout: String,
    /// Raw stderr
    pub stderr: String,
    /// Exit code from the process (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Wall-clock duration of the invocation
    pub duration: Duration,
}

impl CommandOutput {
    pub fn new(stdout: String, stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    /// Check if the command exited successfully
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout with surrounding whitespace removed
    pub fn trimmed_stdout(&self) -> String {
        self.stdout.trim().to_string()
    }
}
