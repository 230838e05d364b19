//! Process runner - executes client-cli and captures its output
//!
//! One call spawns one process, waits for it, and resolves with standard
//! output on exit code 0. Anything else is a [`ProcessError`] that still
//! carries whatever the process printed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("client-cli exited with {}", exit_label(.exit_code))]
    Failed { exit_code: Option<i32>, output: String },

    #[error("client-cli did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("client-cli io: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Output captured before the failure, if any.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            ProcessError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    code.map(|c| format!("code {c}")).unwrap_or_else(|| "signal".into())
}

/// Seam between the orchestrator and the operating system.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[String], work_dir: Option<&Path>) -> Result<String, ProcessError>;
}

/// Runs the real client-cli binary.
#[derive(Debug, Clone)]
pub struct CliRunner {
    program: PathBuf,
    work_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CliRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), work_dir: None, timeout: None }
    }
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.work_dir = Some(dir.into()); self }
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self { self.timeout = timeout; self }

    pub fn program(&self) -> &Path { &self.program }
}

#[async_trait]
impl CommandRunner for CliRunner {
    async fn run(&self, args: &[String], work_dir: Option<&Path>) -> Result<String, ProcessError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = work_dir.or(self.work_dir.as_deref()) {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        // Dropping the wait future on timeout kills the child (kill_on_drop).
        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| ProcessError::TimedOut(limit))??,
            None => wait.await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            if !stderr.trim().is_empty() {
                tracing::debug!(stderr = %stderr.trim(), "client-cli stderr");
            }
            return Ok(stdout);
        }

        let mut captured = stdout;
        captured.push_str(&stderr);
        tracing::warn!(status = %output.status, "client-cli failed");
        Err(ProcessError::Failed { exit_code: output.status.code(), output: captured })
    }
}
