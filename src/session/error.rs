use thiserror::Error;

use crate::assistant::Language;

/// Errors reported by a voice service implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// `end` was called but the remote side has no open session
    #[error("no active session")]
    NoActiveSession,

    #[error("session rejected: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,
}

/// Errors surfaced by the voice session controller
#[derive(Debug, Error)]
pub enum SessionError {
    /// No assistant is configured for a language. Fatal configuration error.
    #[error("no assistant configured for language '{0}'")]
    Resolution(Language),

    #[error("unknown language '{0}'")]
    UnknownLanguage(String),

    /// Opening a session failed; the caller may retry
    #[error("failed to start session: {0}")]
    Connection(#[source] ServiceError),

    /// The service reported a fault while a session was live
    #[error("session transport fault: {0}")]
    Transport(String),

    /// Ending or disposing the connection failed during shutdown
    #[error("teardown failed: {0}")]
    Teardown(#[source] ServiceError),

    #[error("voice session controller has shut down")]
    ControllerClosed,
}
