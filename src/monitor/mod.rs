//! Monitor detection and role resolution.
//!
//! Two detection strategies share the [`Detector`] trait: a native X11
//! RandR query and a user-configured shell command. Whichever runs, the
//! raw output list goes through [`resolve`], which pads it with dummy
//! monitors up to the configured minimum and assigns the fixed
//! primary/left/right roles by position.

pub mod command;
pub mod native;

use thiserror::Error;
use tracing::debug;

pub use command::CommandDetector;
pub use native::NativeDetector;

/// Errors raised while enumerating displays. All of these are fatal to
/// the run; nothing retries.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to connect to X display {display}: {source}")]
    Connect {
        display: String,
        #[source]
        source: x11rb::errors::ConnectError,
    },
    #[error("X11 request failed: {0}")]
    Request(#[from] x11rb::errors::ConnectionError),
    #[error("X11 reply failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
    #[error("failed to run detection command: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("detection command exited with {status}: {stderr}")]
    CommandFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Raw display list as reported by a detection strategy, before any
/// padding or role assignment. Order is significant: it is the sole
/// basis for role assignment downstream. Duplicates are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDisplays {
    pub outputs: Vec<String>,
    /// The output the server designates as primary, if the strategy can
    /// tell. Diagnostic only; roles are assigned by position.
    pub primary_hint: Option<String>,
}

/// A monitor detection strategy.
pub trait Detector {
    fn enumerate(&self) -> Result<RawDisplays, DetectError>;
}

/// The three symbolic positions a layout can reference instead of a
/// literal monitor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Left,
    Right,
}

impl Role {
    /// Parse a role token from a layout. Anything outside the fixed
    /// vocabulary is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "primary_display" => Some(Self::Primary),
            "left_display" => Some(Self::Left),
            "right_display" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Monitors after padding and role assignment. Built once per run and
/// immutable afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedMonitors {
    pub all: Vec<String>,
    pub primary: String,
    pub left: String,
    pub right: String,
}

impl DetectedMonitors {
    /// Monitor name for a role. Empty when fewer monitors were resolved
    /// than the role's position requires.
    pub fn by_role(&self, role: Role) -> &str {
        match role {
            Role::Primary => &self.primary,
            Role::Left => &self.left,
            Role::Right => &self.right,
        }
    }
}

impl std::fmt::Display for DetectedMonitors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "primary: {}, left: {}, right: {}, all: {:?}",
            self.primary, self.left, self.right, self.all
        )
    }
}

/// Pad a raw display list with dummy monitors and assign roles.
///
/// Dummies are consumed left to right, each at most once, and only while
/// the list is shorter than `min_monitors`. Running out of dummies below
/// the minimum just leaves the set short. Roles are positional on the
/// padded list: index 0 is primary, 1 is left, 2 is right; a missing
/// position leaves that role empty.
pub fn resolve(raw: RawDisplays, dummy_monitors: &[String], min_monitors: usize) -> DetectedMonitors {
    let mut all = raw.outputs;

    let mut dummies = dummy_monitors.iter();
    while all.len() < min_monitors {
        match dummies.next() {
            Some(dummy) => all.push(dummy.clone()),
            None => break,
        }
    }

    let primary = all.first().cloned().unwrap_or_default();
    let left = all.get(1).cloned().unwrap_or_default();
    let right = all.get(2).cloned().unwrap_or_default();

    if let Some(hint) = raw.primary_hint {
        if hint != primary {
            debug!("server primary hint '{hint}' differs from positional primary '{primary}'");
        }
    }

    DetectedMonitors {
        all,
        primary,
        left,
        right,
    }
}
