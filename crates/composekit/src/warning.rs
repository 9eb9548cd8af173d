//! Non-fatal operator warnings and where they go.
//!
//! Compose has no stable output contract, so anything the parser cannot make
//! sense of is surfaced here instead of failing the operation.

use crate::types::ResourceKind;
use serde::Serialize;
use std::fmt;

/// Appended to unparseable-line warnings so drift gets reported upstream.
pub const REPORT_HINT: &str =
    "Please report this as a bug, including the output of `docker compose version`";

/// A non-fatal diagnostic produced while reconciling Compose output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A stderr line that does not look like a resource event
    UnparseableLine {
        /// The line exactly as read, before trimming
        line: String,
    },
    /// A resource event whose trailing field is not a known status
    StatusAsMessage {
        /// Resource kind
        resource: ResourceKind,
        /// Resource name
        id: String,
        /// The unrecognized trailing text
        message: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparseableLine { line } => write!(
                f,
                "Cannot parse event from line: {line:?}. {REPORT_HINT}"
            ),
            Self::StatusAsMessage {
                resource,
                id,
                message,
            } => write!(f, "Docker compose: {resource} {id}: {message}"),
        }
    }
}

/// Receiver for warnings emitted during parsing and reconciliation.
pub trait WarningSink {
    /// Accept one warning.
    fn warn(&mut self, warning: Warning);
}

/// Collects warnings in order.
impl WarningSink for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
    }
}

/// Fans a warning out to two sinks.
pub struct Tee<'a, A: WarningSink + ?Sized, B: WarningSink + ?Sized>(pub &'a mut A, pub &'a mut B);

impl<A: WarningSink + ?Sized, B: WarningSink + ?Sized> WarningSink for Tee<'_, A, B> {
    fn warn(&mut self, warning: Warning) {
        self.0.warn(warning.clone());
        self.1.warn(warning);
    }
}
