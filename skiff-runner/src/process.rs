//! External command execution
//!
//! The local pipeline only depends on the exit status, stdout and stderr
//! of the tools it drives (git, docker). `CommandRunner` is the seam:
//! production code spawns real processes, tests substitute a fake.
//!
//! Commands are always spawned from an argument list, never through a shell.

use anyhow::{Context, Result};
use async_trait::async_trait;
use skiff_core::domain::command::CommandOutput;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::debug;

/// A single tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, inherited when `None`
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external commands to completion
///
/// An `Err` means the command could not be run at all (missing binary,
/// bad working directory). A command that ran and exited non-zero is an
/// `Ok` with a non-zero `exit_status`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Production runner backed by `tokio::process`
///
/// No timeout is applied; a command runs until the tool itself gives up.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let line = invocation.display();
        debug!("Running: {}", line);

        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .with_context(|| format!("Failed to execute '{}'", invocation.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_status = output.status.code().unwrap_or(-1);

        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", invocation.program, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", invocation.program, stderr.trim());
        }

        Ok(CommandOutput {
            command: line,
            exit_status,
            stdout,
            stderr,
        })
    }
}
