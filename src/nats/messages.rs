use serde::{Deserialize, Serialize};

use crate::session::ServiceError;

/// Reply code sent by the gateway when `end` finds nothing to close
pub const NO_ACTIVE_SESSION: &str = "no_active_session";

/// Request to open a session, sent to `<prefix>.session.begin`
#[derive(Debug, Serialize, Deserialize)]
pub struct BeginSessionRequest {
    pub connection_id: String,
    pub public_key: String,
    pub assistant_id: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// Request to close a session, sent to `<prefix>.session.end`
#[derive(Debug, Serialize, Deserialize)]
pub struct EndSessionRequest {
    pub connection_id: String,
    pub timestamp: String,
}

/// Gateway reply to begin/end requests
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionReply {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl SessionReply {
    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.ok {
            return Ok(());
        }
        if self.code.as_deref() == Some(NO_ACTIVE_SESSION) {
            return Err(ServiceError::NoActiveSession);
        }
        Err(ServiceError::Rejected(
            self.error.unwrap_or_else(|| "unspecified gateway error".to_string()),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEventKind {
    Ended,
    Error,
}

/// Lifecycle event published on `<prefix>.session.<connection_id>.events`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionEventMessage {
    pub connection_id: String,
    pub kind: SessionEventKind,
    #[serde(default)]
    pub message: Option<String>,
    pub timestamp: String,
}
