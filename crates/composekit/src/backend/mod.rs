//! Backend abstraction for running the Docker CLI.
//!
//! The [`Backend`] trait is the only place processes are spawned, which keeps
//! the reconciliation logic testable with canned output.

pub mod docker;

use crate::error::{Error, Result};
use std::path::Path;

/// Captured result of one CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, -1 when the process was killed by a signal
    pub code: i32,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Backend trait for Docker CLI operations.
pub trait Backend {
    /// Display name of the CLI, used in error messages.
    fn cli(&self) -> String;

    /// Version of the compose plugin, or `None` if it is not installed.
    fn compose_version(&self) -> Result<Option<String>>;

    /// Run `docker <args>` in `cwd` and capture its output.
    fn run(&self, args: &[String], cwd: &Path) -> Result<CommandOutput>;

    /// Run and turn a non-zero exit into [`Error::CommandFailed`].
    fn run_checked(&self, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        let output = self.run(args, cwd)?;
        if !output.success() {
            return Err(Error::CommandFailed {
                args: args.to_vec(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}
