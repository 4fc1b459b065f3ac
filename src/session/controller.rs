use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::adapter::{AdapterEvent, SessionAdapter};
use super::config::SessionConfig;
use super::error::{ServiceError, SessionError};
use super::service::VoiceService;
use super::state::{SessionFailure, SessionSnapshot, SessionState};
use crate::assistant::{AssistantDirectory, Language};

/// Caller request, answered with the state after it was applied
enum Command {
    Start {
        language: Option<Language>,
        reply: oneshot::Sender<SessionState>,
    },
    Stop {
        reply: oneshot::Sender<SessionState>,
    },
    SetLanguage {
        language: Language,
        reply: oneshot::Sender<SessionState>,
    },
    Teardown {
        reply: oneshot::Sender<SessionState>,
    },
}

/// Result of a begin/end request running off the controller task
enum Completion {
    Begin {
        attempt: u64,
        result: Result<(), SessionError>,
    },
    End {
        attempt: u64,
        result: Result<(), ServiceError>,
    },
}

/// Handle to a running voice session controller
///
/// Cloning is cheap; all clones drive the same controller. The controller
/// task owns the state machine and the service connection, so transitions
/// are applied one at a time. When the last clone is dropped the
/// controller tears down its connection and exits.
#[derive(Clone)]
pub struct VoiceSessionController {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl VoiceSessionController {
    /// Spawn the controller task on the current Tokio runtime
    pub fn spawn(service: Arc<dyn VoiceService>, config: SessionConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::new(
            SessionState::Idle,
            config.language,
            None,
        ));

        info!(
            service = service.name(),
            language = %config.language,
            "Starting voice session controller"
        );

        let task = ControllerTask {
            state: SessionState::Idle,
            language: config.language,
            failure: None,
            pending_stop: false,
            attempt: 0,
            stopped_at: None,
            ended_grace: config.ended_grace,
            assistants: config.assistants,
            adapter: SessionAdapter::new(service, config.public_key, event_tx),
            snapshot: snapshot_tx,
            completions: completion_tx,
        };

        tokio::spawn(task.run(command_rx, event_rx, completion_rx));

        Self {
            commands: command_tx,
            snapshot: snapshot_rx,
        }
    }

    /// Start a session in the currently selected language
    pub async fn start(&self) -> Result<SessionState, SessionError> {
        self.request(|reply| Command::Start {
            language: None,
            reply,
        })
        .await
    }

    /// Select `language` (if permitted) and start a session
    pub async fn start_in(&self, language: Language) -> Result<SessionState, SessionError> {
        self.request(|reply| Command::Start {
            language: Some(language),
            reply,
        })
        .await
    }

    /// Stop the current session
    ///
    /// A stop issued while connecting is applied once the connection attempt
    /// resolves.
    pub async fn stop(&self) -> Result<SessionState, SessionError> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Change the selected language. Ignored unless idle or failed.
    pub async fn set_language(&self, language: Language) -> Result<SessionState, SessionError> {
        self.request(|reply| Command::SetLanguage { language, reply })
            .await
    }

    /// Release the service connection regardless of state
    ///
    /// The controller stays usable; the next start creates a new connection.
    pub async fn teardown(&self) -> Result<SessionState, SessionError> {
        self.request(|reply| Command::Teardown { reply }).await
    }

    /// Latest observable snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    /// Subscribe to snapshot updates, published after every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<SessionState>) -> Command,
    ) -> Result<SessionState, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| SessionError::ControllerClosed)?;
        reply_rx.await.map_err(|_| SessionError::ControllerClosed)
    }
}

/// State machine owned by the controller task
struct ControllerTask {
    state: SessionState,
    language: Language,
    failure: Option<SessionFailure>,

    /// Stop requested while connecting
    pending_stop: bool,

    /// Incremented per start and per teardown; stale completions are dropped
    attempt: u64,

    /// When the last stop completed. The handle is reused across sessions,
    /// so the remote `ended` for that stop can arrive after a restart.
    stopped_at: Option<Instant>,
    ended_grace: Duration,

    assistants: AssistantDirectory,
    adapter: SessionAdapter,
    snapshot: watch::Sender<SessionSnapshot>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl ControllerTask {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<AdapterEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event),
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
        }

        self.teardown().await;
        info!("Voice session controller stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { language, reply } => {
                let state = self.start(language).await;
                let _ = reply.send(state);
            }
            Command::Stop { reply } => {
                let state = self.stop();
                let _ = reply.send(state);
            }
            Command::SetLanguage { language, reply } => {
                let state = self.set_language(language);
                let _ = reply.send(state);
            }
            Command::Teardown { reply } => {
                let state = self.teardown().await;
                let _ = reply.send(state);
            }
        }
    }

    async fn start(&mut self, language: Option<Language>) -> SessionState {
        if !self.state.accepts_start() {
            warn!(state = %self.state, "Start ignored; session already in progress");
            return self.state;
        }

        if let Some(language) = language {
            self.language = language;
        }

        let assistant = self.assistants.resolve(self.language).clone();
        self.pending_stop = false;
        self.attempt += 1;

        info!(language = %self.language, assistant = %assistant, "Starting voice session");
        self.transition(SessionState::Connecting);

        let handle = match self.adapter.get_or_create_handle().await {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(e);
                return self.state;
            }
        };

        let attempt = self.attempt;
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = SessionAdapter::begin_session(&handle, &assistant).await;
            let _ = completions.send(Completion::Begin { attempt, result });
        });

        self.state
    }

    fn stop(&mut self) -> SessionState {
        match self.state {
            SessionState::Listening => self.begin_stop(),
            SessionState::Connecting => {
                if !self.pending_stop {
                    info!("Stop requested while connecting; deferring until connected");
                    self.pending_stop = true;
                }
            }
            SessionState::Idle | SessionState::Error | SessionState::Stopping => {
                debug!(state = %self.state, "Stop ignored");
            }
        }
        self.state
    }

    fn begin_stop(&mut self) {
        let Some(handle) = self.adapter.current() else {
            self.transition(SessionState::Idle);
            return;
        };

        self.transition(SessionState::Stopping);

        let attempt = self.attempt;
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = SessionAdapter::end_session(&handle).await;
            let _ = completions.send(Completion::End { attempt, result });
        });
    }

    fn set_language(&mut self, language: Language) -> SessionState {
        if !self.state.accepts_start() {
            warn!(state = %self.state, "Language change ignored during active session");
            return self.state;
        }

        if self.language != language {
            info!(from = %self.language, to = %language, "Language changed");
            self.language = language;
            self.publish();
        }
        self.state
    }

    async fn teardown(&mut self) -> SessionState {
        self.attempt += 1;
        self.pending_stop = false;
        self.stopped_at = None;

        if self.state == SessionState::Listening {
            if let Some(handle) = self.adapter.current() {
                if let Err(e) = SessionAdapter::end_session(&handle).await {
                    error!("{}", SessionError::Teardown(e));
                }
            }
        }

        match self.adapter.dispose().await {
            Ok(true) => info!("Voice connection released"),
            Ok(false) => debug!("No voice connection to release"),
            Err(e) => error!("{}", e),
        }

        if self.state != SessionState::Idle {
            self.transition(SessionState::Idle);
        }
        self.state
    }

    fn handle_event(&mut self, event: AdapterEvent) {
        let generation = match &event {
            AdapterEvent::Ended { generation } | AdapterEvent::Error { generation, .. } => *generation,
        };
        if !self.adapter.is_current(generation) {
            debug!(generation, "Ignoring event from released connection");
            return;
        }

        // At most one `ended` is owed to the previous stop
        let follows_stop = matches!(event, AdapterEvent::Ended { .. })
            && self
                .stopped_at
                .take()
                .is_some_and(|at| at.elapsed() < self.ended_grace);

        match (self.state, event) {
            (SessionState::Listening, AdapterEvent::Ended { .. }) if follows_stop => {
                debug!("Ignoring ended event left over from the previous session");
            }
            (SessionState::Listening, AdapterEvent::Ended { .. }) => {
                info!("Session ended by remote side");
                self.transition(SessionState::Idle);
            }
            (SessionState::Listening, AdapterEvent::Error { message, .. }) => {
                self.fail(SessionError::Transport(message));
            }
            (state, event) => {
                debug!(state = %state, ?event, "Ignoring service event outside listening state");
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Begin { attempt, result } => {
                if attempt != self.attempt || self.state != SessionState::Connecting {
                    debug!(attempt, "Ignoring stale begin completion");
                    return;
                }

                match result {
                    Ok(()) => {
                        self.transition(SessionState::Listening);
                        if std::mem::take(&mut self.pending_stop) {
                            info!("Applying deferred stop");
                            self.begin_stop();
                        }
                    }
                    Err(e) => {
                        self.pending_stop = false;
                        self.fail(e);
                    }
                }
            }
            Completion::End { attempt, result } => {
                if attempt != self.attempt || self.state != SessionState::Stopping {
                    debug!(attempt, "Ignoring stale end completion");
                    return;
                }

                if let Err(e) = result {
                    warn!("Ending session failed: {}", e);
                }
                self.stopped_at = Some(Instant::now());
                self.transition(SessionState::Idle);
            }
        }
    }

    fn fail(&mut self, err: SessionError) {
        error!("Voice session failed: {}", err);
        self.failure = Some(SessionFailure::from_error(&err));
        self.transition(SessionState::Error);
    }

    fn transition(&mut self, to: SessionState) {
        info!(from = %self.state, to = %to, "Session state changed");
        self.state = to;
        if to != SessionState::Error {
            self.failure = None;
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot::new(
            self.state,
            self.language,
            self.failure.clone(),
        ));
    }
}
