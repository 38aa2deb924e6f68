//! External command execution.
//!
//! Every collaborator (`kubectl`, `flux`, `helm`, `kubeconform`, `argocd`)
//! is invoked through [`CommandRunner`]. Each call is attempted exactly once
//! and reported as one of three outcomes: the process exited, it timed out,
//! or the executable could not be found.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{KubeLintError, Result};

/// A single command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name, resolved through `PATH`.
    pub program: String,

    /// Arguments passed after the program name.
    pub args: Vec<String>,

    /// Optional payload written to the child's stdin.
    pub stdin: Option<String>,

    /// Wall-clock limit for the whole invocation.
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
            timeout,
        }
    }

    /// Pipe `data` to the child's stdin.
    pub fn with_stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Space-joined command line, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (`-1` when killed by a signal or never spawned).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration_ms: 0,
        }
    }

    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stderr, falling back to trimmed stdout when stderr is empty.
    pub fn error_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }

    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Terminal state of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited (with any code).
    Exited(CommandOutput),

    /// The process exceeded its timeout and was killed.
    TimedOut { program: String, timeout: Duration },

    /// The executable is not on `PATH`.
    NotFound { program: String },
}

impl RunOutcome {
    pub fn exited(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Exited(CommandOutput::new(exit_code, stdout, stderr))
    }

    /// The captured output, or a tooling error for timeouts and missing
    /// executables. `what` names the operation in timeout messages.
    pub fn into_exited(self, what: &str) -> Result<CommandOutput> {
        match self {
            Self::Exited(out) => Ok(out),
            Self::TimedOut { timeout, .. } => Err(KubeLintError::Timeout {
                command: what.to_string(),
                timeout_secs: timeout.as_secs(),
            }),
            Self::NotFound { program } => Err(KubeLintError::ToolNotFound {
                tool: program,
                install: None,
            }),
        }
    }
}

/// Executes external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` once and report how it ended.
    async fn run(&self, spec: &CommandSpec) -> RunOutcome;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> RunOutcome {
        let start = Instant::now();
        debug!(command = %spec.display(), timeout_secs = spec.timeout.as_secs(), "Spawning command");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(program = %spec.program, "Executable not found on PATH");
                return RunOutcome::NotFound {
                    program: spec.program.clone(),
                };
            }
            Err(e) => {
                warn!(program = %spec.program, error = %e, "Failed to spawn command");
                return RunOutcome::Exited(CommandOutput {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    duration_ms: start.elapsed().as_millis() as u64,
                });
            }
        };

        // stdin is written from its own task while output is collected.
        let writer = match (child.stdin.take(), spec.stdin.clone()) {
            (Some(mut pipe), Some(data)) => Some(tokio::spawn(async move {
                if let Err(e) = pipe.write_all(data.as_bytes()).await {
                    debug!(error = %e, "Child closed stdin early");
                }
            })),
            _ => None,
        };

        let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(program = %spec.program, error = %e, "Failed to collect command output");
                return RunOutcome::Exited(CommandOutput {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    duration_ms: start.elapsed().as_millis() as u64,
                });
            }
            Err(_) => {
                warn!(
                    command = %spec.display(),
                    timeout_secs = spec.timeout.as_secs(),
                    "Command timed out"
                );
                return RunOutcome::TimedOut {
                    program: spec.program.clone(),
                    timeout: spec.timeout,
                };
            }
        };

        if let Some(writer) = writer {
            let _ = writer.await;
        }

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!(
            program = %spec.program,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            "Command finished"
        );
        RunOutcome::Exited(result)
    }
}
