//! HTTP API server for external control (web front-end)
//!
//! This module provides a REST API over the voice session controller:
//! - GET /session - Current state, status text and language
//! - POST /session/start - Start a session (optional `language`)
//! - POST /session/stop - Stop the session
//! - PUT /session/language - Change the selected language
//! - POST /session/teardown - Release the service connection
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
