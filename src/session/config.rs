use std::time::Duration;

use crate::assistant::{AssistantDirectory, Language};

/// Configuration for a voice session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Credential passed to the voice service when a connection is created
    pub public_key: String,

    /// Language → assistant table
    pub assistants: AssistantDirectory,

    /// Language selected at startup
    /// Default: English
    pub language: Language,

    /// Capacity of the caller command queue
    pub command_buffer: usize,

    /// How long after a completed stop a remote `ended` is attributed to
    /// the session that was just stopped
    /// Default: 500ms
    pub ended_grace: Duration,
}

impl SessionConfig {
    pub fn new(public_key: impl Into<String>, assistants: AssistantDirectory) -> Self {
        Self {
            public_key: public_key.into(),
            assistants,
            language: Language::default(),
            command_buffer: 32,
            ended_grace: Duration::from_millis(500),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_ended_grace(mut self, grace: Duration) -> Self {
        self.ended_grace = grace;
        self
    }
}
