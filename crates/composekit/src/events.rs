//! Parser for the resource events `docker compose` writes to stderr.
//!
//! With `--ansi never --progress plain`, Compose reports each resource
//! transition on its own line:
//!
//! ```text
//!  Network flask_default  Creating
//!  Container flask_web_1  Started
//! DRY-RUN MODE -  Container flask_db_1  Recreate
//! ```
//!
//! The format is not a stable interface. Lines that do not match are never
//! fatal; they produce a [`Warning::UnparseableLine`] so the drift gets noticed.

use crate::error::Result;
use crate::types::{Event, ResourceKind};
use crate::warning::{Warning, WarningSink};
use regex::Regex;
use std::sync::LazyLock;

/// Marker Compose puts in front of every event when run with `--dry-run`.
pub const DRY_RUN_MARKER: &str = "DRY-RUN MODE -";

/// Shared event grammar: kind noun, resource id, trailing status or message.
const EVENT_BODY: &str = r"(?P<kind>Network|Image|Volume|Container)\s+(?P<id>\S+)\s+(?P<status>\S(?:.*\S)?)\s*$";

static RE_EVENT: LazyLock<Regex> = LazyLock::new(|| build_event_regex(None));
static RE_EVENT_DRY_RUN: LazyLock<Regex> =
    LazyLock::new(|| build_event_regex(Some(DRY_RUN_MARKER)));

fn build_event_regex(prefix: Option<&str>) -> Regex {
    let prefix = prefix
        .map(|marker| format!(r"{}\s+", regex::escape(marker)))
        .unwrap_or_default();
    Regex::new(&format!(r"^\s*{prefix}{EVENT_BODY}")).expect("event grammar is a valid regex")
}

/// Events extracted from one stderr stream, plus what could not be parsed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedEvents {
    /// Events in stream order
    pub events: Vec<Event>,
    /// One entry per line that did not match the grammar
    pub warnings: Vec<Warning>,
}

impl ParsedEvents {
    /// Hand the parse warnings to a sink and keep the events.
    pub fn into_events(self, sink: &mut dyn WarningSink) -> Vec<Event> {
        for warning in self.warnings {
            sink.warn(warning);
        }
        self.events
    }
}

/// Parse a single line. `Ok(None)` means the line is not an event.
pub fn parse_line(line: &str, dry_run: bool) -> Result<Option<Event>> {
    let re = if dry_run { &*RE_EVENT_DRY_RUN } else { &*RE_EVENT };
    let Some(caps) = re.captures(line.trim()) else {
        return Ok(None);
    };
    let kind: ResourceKind = caps["kind"].parse()?;
    Ok(Some(Event::new(kind, &caps["id"], &caps["status"])))
}

/// Parse every line of a Compose stderr stream.
///
/// Lines that do not match the grammar (blank lines included) each produce one
/// [`Warning::UnparseableLine`] with the line as it appeared.
pub fn parse_events(stderr: &str, dry_run: bool) -> Result<ParsedEvents> {
    let mut parsed = ParsedEvents::default();
    for line in stderr.lines() {
        match parse_line(line, dry_run)? {
            Some(event) => parsed.events.push(event),
            None => parsed.warnings.push(Warning::UnparseableLine {
                line: line.to_string(),
            }),
        }
    }
    Ok(parsed)
}
