//! Error types for Compose lifecycle operations.
//!
//! Only conditions that abort an operation are errors. Output-format drift
//! (unparseable lines, unknown status tokens) is reported through
//! [`Warning`](crate::warning::Warning) instead, and resource failures reported
//! by Compose itself mark the [`Outcome`](crate::types::Outcome) as failed.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving `docker compose`.
#[derive(Debug, Error)]
pub enum Error {
    /// A resource noun outside Network/Image/Volume/Container reached the
    /// kind mapping. The event grammar rules this out, so hitting it means
    /// the grammar and the mapping disagree.
    #[error("unrecognized resource kind: {0:?}")]
    UnrecognizedResourceKind(String),

    /// The Docker CLI executable could not be located
    #[error("docker CLI not found. Install Docker or set `docker` in the config file")]
    DockerNotFound,

    /// The Docker CLI has no compose plugin
    #[error("Docker CLI {cli} does not have the compose plugin installed")]
    ComposePluginMissing {
        /// Path of the Docker CLI that was queried
        cli: String,
    },

    /// The compose plugin is older than the minimum supported version
    #[error(
        "Docker CLI {cli} has the compose plugin with version {version}; need version {minimum} or later"
    )]
    UnsupportedVersion {
        /// Path of the Docker CLI that was queried
        cli: String,
        /// Version reported by the plugin
        version: String,
        /// Minimum supported version
        minimum: String,
    },

    /// A version string could not be parsed
    #[error("invalid compose version: {0:?}")]
    InvalidVersion(String),

    /// The project source is not a directory
    #[error("\"{}\" is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The project source has no Compose file
    #[error("\"{}\" does not contain {expected}", path.display())]
    ComposeFileNotFound {
        /// Project directory that was searched
        path: PathBuf,
        /// Human readable list of accepted file names
        expected: String,
    },

    /// An invocation exited with a non-zero status
    #[error("docker {} failed with exit code {code}: {stderr}", args.join(" "))]
    CommandFailed {
        /// Arguments passed to the Docker CLI
        args: Vec<String>,
        /// Exit code (-1 when terminated by a signal)
        code: i32,
        /// Standard error of the failed invocation
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error signals a broken internal contract rather than a
    /// problem with the environment or the project.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnrecognizedResourceKind(_))
    }

    /// Whether this error was raised while validating the environment and
    /// project, before anything was invoked.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::DockerNotFound
                | Self::ComposePluginMissing { .. }
                | Self::UnsupportedVersion { .. }
                | Self::NotADirectory(_)
                | Self::ComposeFileNotFound { .. }
        )
    }
}

/// Result type for Compose operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let kind = Error::UnrecognizedResourceKind("Secret".to_string());
        assert!(kind.is_contract_violation());
        assert!(!kind.is_precondition());

        let missing = Error::NotADirectory(PathBuf::from("/nope"));
        assert!(missing.is_precondition());
        assert!(!missing.is_contract_violation());

        let failed = Error::CommandFailed {
            args: vec!["compose".to_string(), "up".to_string()],
            code: 1,
            stderr: "boom".to_string(),
        };
        assert!(!failed.is_precondition());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::ComposeFileNotFound {
            path: PathBuf::from("/srv/app"),
            expected: "compose.yaml or docker-compose.yml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "\"/srv/app\" does not contain compose.yaml or docker-compose.yml"
        );

        let err = Error::CommandFailed {
            args: vec!["compose".to_string(), "stop".to_string()],
            code: 2,
            stderr: "no such service".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "docker compose stop failed with exit code 2: no such service"
        );
    }
}
