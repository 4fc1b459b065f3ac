use std::sync::Arc;

use super::error::ServiceError;
use crate::assistant::AssistantId;

/// Invoked when the remote side closes the session
pub type EndedCallback = Box<dyn Fn() + Send + Sync>;

/// Invoked with a description when the audio pipeline or transport fails
pub type ErrorCallback = Box<dyn Fn(String) + Send + Sync>;

/// Streaming voice-AI service capability
///
/// Implementations:
/// - `NatsVoiceService`: voice gateway reachable over NATS request/reply
/// - test fakes that script begin/end outcomes
#[async_trait::async_trait]
pub trait VoiceService: Send + Sync {
    /// Open a connection handle authenticated with `credential`
    async fn create(&self, credential: &str) -> Result<Arc<dyn VoiceConnection>, ServiceError>;

    /// Service name for logging
    fn name(&self) -> &str;
}

/// A live handle to the voice service
#[async_trait::async_trait]
pub trait VoiceConnection: Send + Sync {
    /// Open a session with the given assistant
    async fn begin(&self, assistant: &AssistantId) -> Result<(), ServiceError>;

    /// Request graceful termination of the current session
    ///
    /// Returns `ServiceError::NoActiveSession` if nothing is open.
    async fn end(&self) -> Result<(), ServiceError>;

    /// Register the `ended` notification. Replaces any previous callback.
    fn on_ended(&self, callback: EndedCallback);

    /// Register the `error` notification. Replaces any previous callback.
    fn on_error(&self, callback: ErrorCallback);

    /// Release the connection and drop registered callbacks
    async fn close(&self) -> Result<(), ServiceError>;
}
