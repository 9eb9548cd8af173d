//! Core types for Compose event reconciliation and project options.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Resource kinds
// ============================================================================

/// Kind of infrastructure object a Compose event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A project network
    Network,
    /// An image being pulled or built
    Image,
    /// A named volume
    Volume,
    /// A service container
    Container,
}

impl ResourceKind {
    /// Every kind, in the order Compose usually reports them.
    pub const ALL: [Self; 4] = [Self::Network, Self::Image, Self::Volume, Self::Container];

    /// The capitalized noun Compose prints for this kind.
    pub fn compose_noun(self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Image => "Image",
            Self::Volume => "Volume",
            Self::Container => "Container",
        }
    }

    /// Lowercase name used in results and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Image => "image",
            Self::Volume => "volume",
            Self::Container => "container",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    /// Map a Compose noun to a kind. Matching is exact and case-sensitive.
    fn from_str(noun: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.compose_noun() == noun)
            .ok_or_else(|| Error::UnrecognizedResourceKind(noun.to_string()))
    }
}

impl TryFrom<&str> for ResourceKind {
    type Error = Error;

    fn try_from(noun: &str) -> Result<Self> {
        noun.parse()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Status taxonomy
// ============================================================================

/// Classification of a status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Terminal state or confirmation; never a change by itself
    Done,
    /// In-progress transition; the only signal that something changed
    Working,
    /// The resource transition failed
    Error,
    /// Token outside the known vocabulary
    Unknown,
}

/// Every status token Compose is known to print for resource events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    // Done
    /// Container started
    Started,
    /// Health check passed
    Healthy,
    /// Container exited
    Exited,
    /// Container restarted
    Restarted,
    /// Already running, nothing to do
    Running,
    /// Resource created
    Created,
    /// Container stopped
    Stopped,
    /// Container killed
    Killed,
    /// Resource removed
    Removed,
    /// Container recreated
    Recreated,

    // Working
    /// Resource being created
    Creating,
    /// Container starting
    Starting,
    /// Waiting on a dependency
    Waiting,
    /// Container restarting
    Restarting,
    /// Container stopping
    Stopping,
    /// Container being killed
    Killing,
    /// Resource being removed
    Removing,
    /// Container being recreated
    Recreate,

    // Error
    /// Transition failed
    Error,
}

impl Status {
    /// The full vocabulary, each token exactly once.
    pub const ALL: [Self; 19] = [
        Self::Started,
        Self::Healthy,
        Self::Exited,
        Self::Restarted,
        Self::Running,
        Self::Created,
        Self::Stopped,
        Self::Killed,
        Self::Removed,
        Self::Recreated,
        Self::Creating,
        Self::Starting,
        Self::Waiting,
        Self::Restarting,
        Self::Stopping,
        Self::Killing,
        Self::Removing,
        Self::Recreate,
        Self::Error,
    ];

    /// Token text exactly as Compose prints it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::Healthy => "Healthy",
            Self::Exited => "Exited",
            Self::Restarted => "Restarted",
            Self::Running => "Running",
            Self::Created => "Created",
            Self::Stopped => "Stopped",
            Self::Killed => "Killed",
            Self::Removed => "Removed",
            Self::Recreated => "Recreated",
            Self::Creating => "Creating",
            Self::Starting => "Starting",
            Self::Waiting => "Waiting",
            Self::Restarting => "Restarting",
            Self::Stopping => "Stopping",
            Self::Killing => "Killing",
            Self::Removing => "Removing",
            Self::Recreate => "Recreate",
            Self::Error => "Error",
        }
    }

    /// Look up a token in the vocabulary.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == token)
    }

    /// Class of this status. Never [`StatusClass::Unknown`].
    pub fn class(self) -> StatusClass {
        match self {
            Self::Started
            | Self::Healthy
            | Self::Exited
            | Self::Restarted
            | Self::Running
            | Self::Created
            | Self::Stopped
            | Self::Killed
            | Self::Removed
            | Self::Recreated => StatusClass::Done,
            Self::Creating
            | Self::Starting
            | Self::Waiting
            | Self::Restarting
            | Self::Stopping
            | Self::Killing
            | Self::Removing
            | Self::Recreate => StatusClass::Working,
            Self::Error => StatusClass::Error,
        }
    }

    /// Whether this status marks a change in progress.
    pub fn is_working(self) -> bool {
        self.class() == StatusClass::Working
    }

    /// Whether this status reports a failure.
    pub fn is_error(self) -> bool {
        self.class() == StatusClass::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw token.
pub fn classify(token: &str) -> StatusClass {
    Status::from_token(token).map_or(StatusClass::Unknown, Status::class)
}

// ============================================================================
// Events
// ============================================================================

/// Trailing field of an event line: a known status or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    /// Token from the known vocabulary
    Status(Status),
    /// Anything else, kept verbatim
    Message(String),
}

/// One resource lifecycle event reported by Compose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Resource kind
    pub kind: ResourceKind,
    /// Resource name, never empty
    pub id: String,
    /// Status or message
    pub detail: EventDetail,
}

impl Event {
    /// Build an event, reading the trailing field as a status when it is in
    /// the vocabulary and as a message otherwise.
    pub fn new(kind: ResourceKind, id: impl Into<String>, trailing: &str) -> Self {
        let detail = match Status::from_token(trailing) {
            Some(status) => EventDetail::Status(status),
            None => EventDetail::Message(trailing.to_string()),
        };
        Self {
            kind,
            id: id.into(),
            detail,
        }
    }

    /// The status, if the trailing field was a known token.
    pub fn status(&self) -> Option<Status> {
        match self.detail {
            EventDetail::Status(status) => Some(status),
            EventDetail::Message(_) => None,
        }
    }

    /// The free-text message, if the trailing field was not a known token.
    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            EventDetail::Status(_) => None,
            EventDetail::Message(message) => Some(message),
        }
    }

    /// Class of the event's status; `Unknown` for message events.
    pub fn class(&self) -> StatusClass {
        self.status().map_or(StatusClass::Unknown, Status::class)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// A state-changing action taken on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Resource kind
    pub what: ResourceKind,
    /// Resource name
    pub id: String,
    /// The in-progress status that was reported
    pub status: Status,
}

/// Reconciled result of one or more Compose invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether any resource went through an in-progress transition
    pub changed: bool,
    /// Transitions in the order Compose reported them
    pub actions: Vec<ActionRecord>,
    /// Set when some resource reported `Error`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    /// One line per failed resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

// ============================================================================
// Project options
// ============================================================================

/// Desired state of a Compose project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectState {
    /// `docker compose up`
    #[default]
    Present,
    /// `docker compose stop`
    Stopped,
    /// `docker compose restart`
    Restarted,
    /// `docker compose down`
    Absent,
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::Stopped => "stopped",
            Self::Restarted => "restarted",
            Self::Absent => "absent",
        })
    }
}

/// Container recreation policy for `up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recreate {
    /// Recreate containers whose configuration changed
    #[default]
    Auto,
    /// Always recreate (`--force-recreate`)
    Always,
    /// Never recreate (`--no-recreate`)
    Never,
}

/// Which images `down` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoveImages {
    /// Every image used by the project
    All,
    /// Only images without a custom tag
    Local,
}

impl RemoveImages {
    /// Value passed to `--rmi`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Local => "local",
        }
    }
}

/// Everything needed to drive one Compose project.
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// Directory holding the Compose file
    pub project_src: PathBuf,
    /// Project name; Compose derives it from the directory when unset
    pub project_name: Option<String>,
    /// Environment files, relative to `project_src`
    pub env_files: Vec<PathBuf>,
    /// Profiles to enable
    pub profiles: Vec<String>,
    /// Desired state
    pub state: ProjectState,
    /// Include linked services for `up` and `restart`
    pub dependencies: bool,
    /// Recreation policy for `up`
    pub recreate: Recreate,
    /// Images removed by `down`
    pub remove_images: Option<RemoveImages>,
    /// Remove named volumes on `down`
    pub remove_volumes: bool,
    /// Remove containers for services no longer in the Compose file
    pub remove_orphans: bool,
    /// Shutdown timeout in seconds, forwarded as `--timeout`
    pub timeout: Option<u32>,
    /// Simulate with `--dry-run` instead of mutating
    pub check_mode: bool,
}

impl ProjectOptions {
    /// Options with defaults for everything but the project directory.
    pub fn new(project_src: impl Into<PathBuf>) -> Self {
        Self {
            project_src: project_src.into(),
            project_name: None,
            env_files: Vec::new(),
            profiles: Vec::new(),
            state: ProjectState::default(),
            dependencies: true,
            recreate: Recreate::default(),
            remove_images: None,
            remove_volumes: false,
            remove_orphans: false,
            timeout: None,
            check_mode: false,
        }
    }

    /// Set the desired state
    pub fn with_state(mut self, state: ProjectState) -> Self {
        self.state = state;
        self
    }

    /// Enable check mode
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }
}
