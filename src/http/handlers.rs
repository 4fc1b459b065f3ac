use super::state::AppState;
use crate::assistant::Language;
use crate::session::{status, SessionError, SessionSnapshot, SessionState};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Language for this session (defaults to the current selection)
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// State right after the request was applied
    pub outcome: SessionState,

    /// Usage hint in the selected language
    pub hint: &'static str,

    /// Whether the UI should lay out right-to-left
    pub rtl: bool,

    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

impl SessionResponse {
    fn new(outcome: SessionState, snapshot: SessionSnapshot) -> Self {
        Self {
            outcome,
            hint: status::prompt_hint(snapshot.language),
            rtl: snapshot.language.is_rtl(),
            snapshot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn respond(state: &AppState, result: Result<SessionState, SessionError>) -> Response {
    match result {
        Ok(session_state) => (
            StatusCode::OK,
            Json(SessionResponse::new(session_state, state.controller.snapshot())),
        )
            .into_response(),
        Err(e) => {
            error!("Session request failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /session
/// Current session snapshot
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.controller.snapshot();
    Json(SessionResponse::new(snapshot.state, snapshot))
}

/// POST /session/start
/// Start a session, optionally switching language first
pub async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // An empty body or one sent without a content type means "no language".
    // Anything else has to be a valid request.
    let req = if body.iter().all(u8::is_ascii_whitespace)
        || !headers.contains_key(header::CONTENT_TYPE)
    {
        StartSessionRequest::default()
    } else {
        match Json::<StartSessionRequest>::from_bytes(&body) {
            Ok(Json(req)) => req,
            Err(rejection) => {
                info!("Rejected start request: {}", rejection.body_text());
                return rejection.into_response();
            }
        }
    };

    info!("Start requested (language={:?})", req.language);

    let result = match req.language {
        Some(language) => state.controller.start_in(language).await,
        None => state.controller.start().await,
    };
    respond(&state, result)
}

/// POST /session/stop
pub async fn stop_session(State(state): State<AppState>) -> Response {
    info!("Stop requested");
    let result = state.controller.stop().await;
    respond(&state, result)
}

/// PUT /session/language
pub async fn set_language(
    State(state): State<AppState>,
    Json(req): Json<SetLanguageRequest>,
) -> Response {
    let result = state.controller.set_language(req.language).await;
    respond(&state, result)
}

/// POST /session/teardown
/// Release the service connection
pub async fn teardown_session(State(state): State<AppState>) -> Response {
    info!("Teardown requested");
    let result = state.controller.teardown().await;
    respond(&state, result)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
