//! Asynchronous subprocess runner with full output capture.
//!
//! Both output streams are drained concurrently with the wait on the
//! child; draining after exit would deadlock any process that fills a
//! pipe buffer first. On timeout the child is killed and whatever the
//! drains collected up to that point is still returned, so callers can
//! salvage partial output from a run that went over budget.

use std::borrow::Cow;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::xcode::BuildInvocation;

/// Exit code reported when the process produced none: killed on
/// timeout, or terminated by a signal.
pub const SYNTHETIC_FAILURE_CODE: i32 = -1;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to capture {stream} of {executable}")]
    Capture {
        executable: String,
        stream: &'static str,
    },
    #[error("failed while waiting for {executable}: {source}")]
    Wait {
        executable: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything observable about a finished subprocess.
///
/// `succeeded` is always `exit_code == 0`; the constructor computes it
/// so the two can never disagree. A timed-out run reports the synthetic
/// exit code, which keeps the equivalence intact.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub succeeded: bool,
    pub duration_millis: u64,
    pub timed_out: bool,
    #[serde(skip)]
    pub stdout: Vec<u8>,
    #[serde(skip)]
    pub stderr: Vec<u8>,
}

impl ProcessOutcome {
    pub fn new(
        exit_code: i32,
        duration: Duration,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        timed_out: bool,
    ) -> Self {
        ProcessOutcome {
            exit_code,
            succeeded: exit_code == 0,
            duration_millis: duration.as_millis() as u64,
            timed_out,
            stdout,
            stderr,
        }
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_millis)
    }
}

/// Executes invocations. The trait seam lets orchestration be tested
/// against scripted outcomes without spawning anything.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &BuildInvocation) -> Result<ProcessOutcome, RunnerError>;
}

/// Runner backed by real child processes.
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, invocation: &BuildInvocation) -> Result<ProcessOutcome, RunnerError> {
        let mut command = Command::new(&invocation.executable);
        command
            .args(&invocation.arguments)
            .current_dir(&invocation.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            command = %invocation.command_line(),
            working_directory = %invocation.working_directory.display(),
            timeout_secs = invocation.timeout_secs,
            "spawning subprocess"
        );

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            executable: invocation.executable.clone(),
            source,
        })?;

        let mut stdout_pipe = child.stdout.take().ok_or_else(|| RunnerError::Capture {
            executable: invocation.executable.clone(),
            stream: "stdout",
        })?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| RunnerError::Capture {
            executable: invocation.executable.clone(),
            stream: "stderr",
        })?;

        // Drains run for the lifetime of the child, including across a
        // kill, so partial output survives a timeout.
        let stdout_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buffer).await;
            buffer
        });
        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buffer).await;
            buffer
        });

        let budget = Duration::from_secs(invocation.timeout_secs);
        let (exit_code, timed_out) = match timeout(budget, child.wait()).await {
            Ok(Ok(status)) => (status.code().unwrap_or(SYNTHETIC_FAILURE_CODE), false),
            Ok(Err(source)) => {
                return Err(RunnerError::Wait {
                    executable: invocation.executable.clone(),
                    source,
                });
            }
            Err(_elapsed) => {
                warn!(
                    command = %invocation.command_line(),
                    timeout_secs = invocation.timeout_secs,
                    "subprocess exceeded its time budget, killing it"
                );
                let _ = child.kill().await;
                (SYNTHETIC_FAILURE_CODE, true)
            }
        };
        let duration = started.elapsed();

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        debug!(
            exit_code,
            timed_out,
            duration_millis = duration.as_millis() as u64,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "subprocess finished"
        );

        Ok(ProcessOutcome::new(
            exit_code, duration, stdout, stderr, timed_out,
        ))
    }
}
