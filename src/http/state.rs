use crate::session::VoiceSessionController;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The process-wide voice session controller
    pub controller: VoiceSessionController,
}

impl AppState {
    pub fn new(controller: VoiceSessionController) -> Self {
        Self { controller }
    }
}
