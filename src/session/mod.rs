//! Voice session management
//!
//! This module provides the `VoiceSessionController` that manages:
//! - The lifecycle of one session against a streaming voice-AI service
//! - Assistant selection by language
//! - Forwarding of `ended` / `error` notifications into state transitions
//! - Observable state and localized status text

mod adapter;
mod config;
mod controller;
mod error;
mod service;
mod state;
pub mod status;

pub use config::SessionConfig;
pub use controller::VoiceSessionController;
pub use error::{ServiceError, SessionError};
pub use service::{EndedCallback, ErrorCallback, VoiceConnection, VoiceService};
pub use state::{FailureKind, SessionFailure, SessionSnapshot, SessionState};
