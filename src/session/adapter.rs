use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::error::{ServiceError, SessionError};
use super::service::{VoiceConnection, VoiceService};
use crate::assistant::AssistantId;

/// Notification forwarded from the voice service to the controller
///
/// `generation` identifies the handle that raised it, so events from a
/// disposed handle can be told apart from the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AdapterEvent {
    Ended { generation: u64 },
    Error { generation: u64, message: String },
}

/// The single cached connection to the voice service
#[derive(Clone)]
pub(crate) struct SessionHandle {
    connection: Arc<dyn VoiceConnection>,
    generation: u64,
}

/// Boundary between the controller and the voice service
///
/// Owns at most one handle, created on first use and kept until disposed.
pub(crate) struct SessionAdapter {
    service: Arc<dyn VoiceService>,
    credential: String,
    handle: Option<SessionHandle>,
    generation: u64,
    events: mpsc::UnboundedSender<AdapterEvent>,
}

impl SessionAdapter {
    pub(crate) fn new(
        service: Arc<dyn VoiceService>,
        credential: String,
        events: mpsc::UnboundedSender<AdapterEvent>,
    ) -> Self {
        Self {
            service,
            credential,
            handle: None,
            generation: 0,
            events,
        }
    }

    /// Return the cached handle, creating and wiring it on first use
    pub(crate) async fn get_or_create_handle(&mut self) -> Result<SessionHandle, SessionError> {
        if let Some(handle) = &self.handle {
            return Ok(handle.clone());
        }

        info!("Creating {} connection", self.service.name());

        let connection = self
            .service
            .create(&self.credential)
            .await
            .map_err(SessionError::Connection)?;

        self.generation += 1;
        let generation = self.generation;

        let events = self.events.clone();
        connection.on_ended(Box::new(move || {
            let _ = events.send(AdapterEvent::Ended { generation });
        }));

        let events = self.events.clone();
        connection.on_error(Box::new(move |message: String| {
            let _ = events.send(AdapterEvent::Error { generation, message });
        }));

        let handle = SessionHandle {
            connection,
            generation,
        };
        self.handle = Some(handle.clone());

        Ok(handle)
    }

    pub(crate) fn current(&self) -> Option<SessionHandle> {
        self.handle.clone()
    }

    /// Whether `generation` belongs to the live handle
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| handle.generation == generation)
    }

    /// Open a session for `assistant`
    pub(crate) async fn begin_session(
        handle: &SessionHandle,
        assistant: &AssistantId,
    ) -> Result<(), SessionError> {
        handle
            .connection
            .begin(assistant)
            .await
            .map_err(SessionError::Connection)
    }

    /// End the current session. A missing session counts as already ended.
    pub(crate) async fn end_session(handle: &SessionHandle) -> Result<(), ServiceError> {
        match handle.connection.end().await {
            Err(ServiceError::NoActiveSession) => {
                debug!("No active session to end; treating as ended");
                Ok(())
            }
            other => other,
        }
    }

    /// Release the handle. Returns whether one existed.
    pub(crate) async fn dispose(&mut self) -> Result<bool, SessionError> {
        let Some(handle) = self.handle.take() else {
            return Ok(false);
        };

        info!(generation = handle.generation, "Disposing voice connection");

        handle
            .connection
            .close()
            .await
            .map_err(SessionError::Teardown)?;

        Ok(true)
    }
}
