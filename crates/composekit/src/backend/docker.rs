//! Real backend that shells out to the `docker` CLI.

use crate::backend::{Backend, CommandOutput};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Backend that executes real `docker` commands.
#[derive(Debug, Clone)]
pub struct DockerCli {
    /// Path to the docker executable
    path: PathBuf,
}

impl DockerCli {
    /// Locate `docker` on `PATH`.
    pub fn new() -> Result<Self> {
        Ok(Self { path: find_docker()? })
    }

    /// Use an explicit executable path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::DockerNotFound);
        }
        Ok(Self { path })
    }

    /// The resolved executable.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for DockerCli {
    fn cli(&self) -> String {
        self.path.display().to_string()
    }

    fn compose_version(&self) -> Result<Option<String>> {
        let output: CommandOutput = Command::new(&self.path)
            .args(["compose", "version", "--short"])
            .output()?
            .into();

        // Without the plugin, docker rejects `compose` as an unknown command
        if !output.success() {
            log::debug!("compose plugin not available: {}", output.stderr.trim());
            return Ok(None);
        }

        let version = output.stdout.trim();
        Ok((!version.is_empty()).then(|| version.to_string()))
    }

    fn run(&self, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        log::debug!("Running {} {} in {}", self.path.display(), args.join(" "), cwd.display());
        let output = Command::new(&self.path)
            .args(args)
            .current_dir(cwd)
            .output()?;
        let output = CommandOutput::from(output);
        log::trace!("exit code {}, stderr:\n{}", output.code, output.stderr);
        Ok(output)
    }
}

/// Common install locations when `docker` is not on `PATH`.
const CANDIDATES: [&str; 3] = [
    "/usr/bin/docker",
    "/usr/local/bin/docker",
    "/opt/homebrew/bin/docker",
];

/// Find the docker executable path.
fn find_docker() -> Result<PathBuf> {
    let candidates = CANDIDATES.map(Path::new);
    resolve_docker(which::which("docker").ok(), &candidates).ok_or(Error::DockerNotFound)
}

/// Prefer the `PATH` hit, then the first existing candidate.
fn resolve_docker(on_path: Option<PathBuf>, candidates: &[&Path]) -> Option<PathBuf> {
    on_path.or_else(|| {
        candidates
            .iter()
            .find(|path| path.exists())
            .map(|path| path.to_path_buf())
    })
}
