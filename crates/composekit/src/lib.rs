//! # composekit
//!
//! Idempotent lifecycle management for Docker Compose projects.
//!
//! `docker compose` has no machine-readable output for `up`, `stop`,
//! `restart` or `down`. This crate reads the per-resource status lines the
//! plugin writes to stderr and reconciles them into a typed [`Outcome`]:
//!
//! - whether anything **changed** (only in-progress verbs such as `Creating`
//!   or `Stopping` count; confirmations like `Running` do not),
//! - an ordered list of **actions**,
//! - a **failed** flag and message when Compose reports `Error` for a resource.
//!
//! Lines that cannot be understood become [`Warning`]s rather than errors, so a
//! new plugin release degrades to noisy output instead of a broken run.
//!
//! ## Example
//!
//! ```no_run
//! use composekit::{DockerCli, LogSink, ProjectManager, ProjectOptions, ProjectState};
//!
//! let backend = DockerCli::new().expect("docker not available");
//! let options = ProjectOptions::new("./flask").with_state(ProjectState::Stopped);
//! let manager = ProjectManager::new(backend, options).expect("invalid project");
//!
//! let result = manager.run(&mut LogSink).expect("compose failed");
//! println!("changed: {}", result.outcome.changed);
//! ```
//!
//! ## Offline reconciliation
//!
//! ```
//! use composekit::reconcile_stderr;
//!
//! let mut warnings: Vec<composekit::Warning> = Vec::new();
//! let outcome = reconcile_stderr(" Container flask_web_1  Creating\n", false, &mut warnings).unwrap();
//! assert!(outcome.changed);
//! assert!(warnings.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod command;
pub mod error;
pub mod events;
pub mod inventory;
pub mod manager;
pub mod reconcile;
pub mod types;
pub mod version;
pub mod warning;

pub use backend::docker::DockerCli;
pub use backend::{Backend, CommandOutput};
pub use error::{Error, Result};
pub use events::{ParsedEvents, parse_events};
pub use inventory::{Container, Image};
pub use manager::{ProjectManager, ProjectResult};
pub use types::{
    ActionRecord, Event, Outcome, ProjectOptions, ProjectState, Recreate, RemoveImages,
    ResourceKind, Status, StatusClass, classify,
};
pub use version::ComposeVersion;
pub use warning::{LogSink, Warning, WarningSink};

/// Parse and reconcile one captured stderr stream without invoking Docker.
pub fn reconcile_stderr(
    stderr: &str,
    dry_run: bool,
    sink: &mut dyn WarningSink,
) -> Result<Outcome> {
    let events = parse_events(stderr, dry_run)?.into_events(sink);
    reconcile::emit_warnings(&events, sink);
    Ok(Outcome::from_events(&events))
}
