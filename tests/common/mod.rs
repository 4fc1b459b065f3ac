// Scripted in-memory voice service shared by the integration tests
//
// Records every call made by the controller and lets tests decide how
// begin/end resolve and when the remote side raises events.

#![allow(dead_code)]

use loqa_voice::session::{EndedCallback, ErrorCallback};
use loqa_voice::{
    AssistantDirectory, AssistantId, ServiceError, SessionConfig, SessionSnapshot, SessionState,
    VoiceConnection, VoiceService,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

pub const ENGLISH_ASSISTANT: &str = "assistant-en";
pub const ARABIC_ASSISTANT: &str = "assistant-ar";

pub fn session_config() -> SessionConfig {
    let assistants = AssistantDirectory::new(ENGLISH_ASSISTANT, ARABIC_ASSISTANT).unwrap();
    SessionConfig::new("test-public-key", assistants)
}

/// Wait until the observed state equals `state`
pub async fn wait_for_state(
    updates: &mut watch::Receiver<SessionSnapshot>,
    state: SessionState,
) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(2), updates.wait_for(|s| s.state == state))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {state}"))
        .expect("controller dropped")
        .clone()
}

#[derive(Default)]
struct Calls {
    credentials: Vec<String>,
    begins: Vec<String>,
    ends: usize,
    closes: usize,
}

#[derive(Default)]
struct Script {
    begin_results: VecDeque<Result<(), ServiceError>>,
    end_results: VecDeque<Result<(), ServiceError>>,
    begin_gate: Option<Arc<Notify>>,
}

#[derive(Clone, Default)]
pub struct FakeVoiceService {
    calls: Arc<Mutex<Calls>>,
    script: Arc<Mutex<Script>>,
    connections: Arc<Mutex<Vec<Arc<FakeConnection>>>>,
}

impl FakeVoiceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn VoiceService> {
        Arc::new(self.clone())
    }

    /// Queue the outcome of the next `begin` (default: success)
    pub fn push_begin_result(&self, result: Result<(), ServiceError>) {
        self.script.lock().unwrap().begin_results.push_back(result);
    }

    /// Queue the outcome of the next `end` (default: success)
    pub fn push_end_result(&self, result: Result<(), ServiceError>) {
        self.script.lock().unwrap().end_results.push_back(result);
    }

    /// Hold every `begin` until the returned gate is notified
    pub fn hold_begin(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script.lock().unwrap().begin_gate = Some(Arc::clone(&gate));
        gate
    }

    pub fn creates(&self) -> usize {
        self.calls.lock().unwrap().credentials.len()
    }

    pub fn credentials(&self) -> Vec<String> {
        self.calls.lock().unwrap().credentials.clone()
    }

    pub fn begins(&self) -> Vec<String> {
        self.calls.lock().unwrap().begins.clone()
    }

    pub fn ends(&self) -> usize {
        self.calls.lock().unwrap().ends
    }

    pub fn closes(&self) -> usize {
        self.calls.lock().unwrap().closes
    }

    pub fn connection(&self, index: usize) -> Arc<FakeConnection> {
        Arc::clone(&self.connections.lock().unwrap()[index])
    }

    pub fn latest_connection(&self) -> Arc<FakeConnection> {
        Arc::clone(self.connections.lock().unwrap().last().expect("no connection created"))
    }
}

#[async_trait::async_trait]
impl VoiceService for FakeVoiceService {
    async fn create(&self, credential: &str) -> Result<Arc<dyn VoiceConnection>, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .credentials
            .push(credential.to_string());

        let connection = Arc::new(FakeConnection {
            calls: Arc::clone(&self.calls),
            script: Arc::clone(&self.script),
            ended: Mutex::new(None),
            error: Mutex::new(None),
            released_ended: Mutex::new(None),
            released_error: Mutex::new(None),
        });
        self.connections.lock().unwrap().push(Arc::clone(&connection));

        Ok(connection)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub struct FakeConnection {
    calls: Arc<Mutex<Calls>>,
    script: Arc<Mutex<Script>>,
    ended: Mutex<Option<EndedCallback>>,
    error: Mutex<Option<ErrorCallback>>,

    /// Callbacks detached by `close`, kept to replay events still in flight
    released_ended: Mutex<Option<EndedCallback>>,
    released_error: Mutex<Option<ErrorCallback>>,
}

impl FakeConnection {
    /// Simulate the remote side closing the session
    pub fn emit_ended(&self) {
        if let Some(callback) = self.ended.lock().unwrap().as_ref() {
            callback();
        }
    }

    /// Simulate a pipeline/transport failure
    pub fn emit_error(&self, message: &str) {
        if let Some(callback) = self.error.lock().unwrap().as_ref() {
            callback(message.to_string());
        }
    }

    /// Fire the `ended` callback this connection had before it was closed,
    /// as a remote event racing the release would
    pub fn emit_ended_after_close(&self) {
        let released = self.released_ended.lock().unwrap();
        let callback = released.as_ref().expect("connection was not closed");
        callback();
    }

    /// Fire the `error` callback this connection had before it was closed
    pub fn emit_error_after_close(&self, message: &str) {
        let released = self.released_error.lock().unwrap();
        let callback = released.as_ref().expect("connection was not closed");
        callback(message.to_string());
    }

    pub fn has_callbacks(&self) -> bool {
        self.ended.lock().unwrap().is_some() && self.error.lock().unwrap().is_some()
    }
}

#[async_trait::async_trait]
impl VoiceConnection for FakeConnection {
    async fn begin(&self, assistant: &AssistantId) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .begins
            .push(assistant.to_string());

        let gate = self.script.lock().unwrap().begin_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.script
            .lock()
            .unwrap()
            .begin_results
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn end(&self) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().ends += 1;
        self.script
            .lock()
            .unwrap()
            .end_results
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn on_ended(&self, callback: EndedCallback) {
        *self.ended.lock().unwrap() = Some(callback);
    }

    fn on_error(&self, callback: ErrorCallback) {
        *self.error.lock().unwrap() = Some(callback);
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().closes += 1;
        *self.released_ended.lock().unwrap() = self.ended.lock().unwrap().take();
        *self.released_error.lock().unwrap() = self.error.lock().unwrap().take();
        Ok(())
    }
}
