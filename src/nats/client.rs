use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::messages::{
    BeginSessionRequest, EndSessionRequest, SessionEventKind, SessionEventMessage, SessionReply,
};
use crate::assistant::AssistantId;
use crate::session::{EndedCallback, ErrorCallback, ServiceError, VoiceConnection, VoiceService};

/// Voice service reached through a NATS voice gateway
///
/// Begin/end are request/reply calls; lifecycle events arrive on a
/// per-connection subject.
pub struct NatsVoiceService {
    client: Client,
    subject_prefix: String,
    request_timeout: Duration,
}

impl NatsVoiceService {
    /// Connect to NATS server
    pub async fn connect(
        url: &str,
        subject_prefix: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject_prefix: subject_prefix.into(),
            request_timeout,
        })
    }
}

#[async_trait::async_trait]
impl VoiceService for NatsVoiceService {
    async fn create(&self, credential: &str) -> Result<Arc<dyn VoiceConnection>, ServiceError> {
        let connection_id = uuid::Uuid::new_v4().to_string();
        let subject = format!("{}.session.{}.events", self.subject_prefix, connection_id);

        info!("Subscribing to session events on {}", subject);

        let mut subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let callbacks = Arc::new(Mutex::new(Callbacks::default()));

        let listener = {
            let callbacks = Arc::clone(&callbacks);
            let connection_id = connection_id.clone();
            tokio::spawn(async move {
                while let Some(msg) = subscriber.next().await {
                    match serde_json::from_slice::<SessionEventMessage>(&msg.payload) {
                        Ok(event) => {
                            if event.connection_id != connection_id {
                                continue;
                            }
                            callbacks
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .dispatch(event);
                        }
                        Err(e) => {
                            warn!("Failed to parse session event on {}: {}", subject, e);
                        }
                    }
                }

                info!("Session event listener stopped");
            })
        };

        Ok(Arc::new(NatsVoiceConnection {
            client: self.client.clone(),
            connection_id,
            public_key: credential.to_string(),
            subject_prefix: self.subject_prefix.clone(),
            request_timeout: self.request_timeout,
            callbacks,
            listener: Mutex::new(Some(listener)),
        }))
    }

    fn name(&self) -> &str {
        "nats"
    }
}

#[derive(Default)]
struct Callbacks {
    ended: Option<EndedCallback>,
    error: Option<ErrorCallback>,
}

impl Callbacks {
    fn dispatch(&self, event: SessionEventMessage) {
        match event.kind {
            SessionEventKind::Ended => {
                if let Some(callback) = &self.ended {
                    callback();
                }
            }
            SessionEventKind::Error => {
                if let Some(callback) = &self.error {
                    let message = event
                        .message
                        .unwrap_or_else(|| "voice gateway reported an error".to_string());
                    callback(message);
                }
            }
        }
    }
}

/// One gateway connection, identified by a generated connection ID
pub struct NatsVoiceConnection {
    client: Client,
    connection_id: String,
    public_key: String,
    subject_prefix: String,
    request_timeout: Duration,
    callbacks: Arc<Mutex<Callbacks>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl NatsVoiceConnection {
    async fn request<T: Serialize>(&self, action: &str, body: &T) -> Result<(), ServiceError> {
        let subject = format!("{}.session.{}", self.subject_prefix, action);
        let payload = serde_json::to_vec(body).map_err(|e| ServiceError::Transport(e.to_string()))?;

        let reply = tokio::time::timeout(
            self.request_timeout,
            self.client.request(subject.clone(), payload.into()),
        )
        .await
        .map_err(|_| ServiceError::Timeout)?
        .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let reply: SessionReply = serde_json::from_slice(&reply.payload)
            .map_err(|e| ServiceError::Transport(format!("invalid reply on {}: {}", subject, e)))?;

        reply.into_result()
    }
}

#[async_trait::async_trait]
impl VoiceConnection for NatsVoiceConnection {
    async fn begin(&self, assistant: &AssistantId) -> Result<(), ServiceError> {
        info!(
            "Requesting session (connection={}, assistant={})",
            self.connection_id, assistant
        );

        let request = BeginSessionRequest {
            connection_id: self.connection_id.clone(),
            public_key: self.public_key.clone(),
            assistant_id: assistant.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        self.request("begin", &request).await
    }

    async fn end(&self) -> Result<(), ServiceError> {
        info!("Ending session (connection={})", self.connection_id);

        let request = EndSessionRequest {
            connection_id: self.connection_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        self.request("end", &request).await
    }

    fn on_ended(&self, callback: EndedCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ended = Some(callback);
    }

    fn on_error(&self, callback: ErrorCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .error = Some(callback);
    }

    async fn close(&self) -> Result<(), ServiceError> {
        info!("Closing voice connection {}", self.connection_id);

        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            // Dropping the subscriber inside the task unsubscribes
            listener.abort();
        }

        *self.callbacks.lock().unwrap_or_else(PoisonError::into_inner) = Callbacks::default();

        Ok(())
    }
}
