use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::SessionError;
use super::status;
use crate::assistant::Language;

/// Lifecycle state of the voice session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Listening,
    Stopping,
    Error,
}

impl SessionState {
    /// Whether a new session may be started from this state
    pub fn accepts_start(self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Error)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Listening => "listening",
            SessionState::Stopping => "stopping",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Why the session entered `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Opening the session failed
    Connection,
    /// The service faulted while listening
    Transport,
}

/// Failure recorded alongside the `Error` state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl SessionFailure {
    pub(crate) fn from_error(err: &SessionError) -> Self {
        let kind = match err {
            SessionError::Transport(_) => FailureKind::Transport,
            _ => FailureKind::Connection,
        };
        Self {
            kind,
            detail: err.to_string(),
        }
    }
}

/// Observer view of the controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current lifecycle state
    pub state: SessionState,

    /// Localized status line for display
    pub status: String,

    /// Language selected for the next session and for status text
    pub language: Language,

    /// Failure that caused the current `Error` state, if any
    pub failure: Option<SessionFailure>,

    /// When this snapshot was produced
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub(crate) fn new(
        state: SessionState,
        language: Language,
        failure: Option<SessionFailure>,
    ) -> Self {
        let kind = failure.as_ref().map(|f| f.kind);
        Self {
            state,
            status: status::status_text(state, kind, language).to_string(),
            language,
            failure,
            updated_at: Utc::now(),
        }
    }
}
