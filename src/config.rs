use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::assistant::{AssistantDirectory, Language};
use crate::session::SessionConfig;

/// Environment overrides use this prefix, e.g. `LOQA_VOICE__VOICE__PUBLIC_KEY`
const ENV_PREFIX: &str = "LOQA_VOICE";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub voice: VoiceConfig,
    pub assistants: AssistantsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct VoiceConfig {
    /// Credential handed to the voice service
    pub public_key: String,
    #[serde(default = "default_nats_url")]
    pub nats_url: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default)]
    pub default_language: Language,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Window after a stop in which a remote `ended` belongs to the old session
    #[serde(default = "default_ended_grace_ms")]
    pub ended_grace_ms: u64,
}

/// Assistant identifier per language
#[derive(Debug, Deserialize)]
pub struct AssistantsConfig {
    pub en: String,
    pub ar: String,
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_subject_prefix() -> String {
    "voice".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_ended_grace_ms() -> u64 {
    500
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Language → assistant table; fails on blank identifiers
    pub fn assistant_directory(&self) -> Result<AssistantDirectory> {
        AssistantDirectory::new(&self.assistants.en, &self.assistants.ar)
            .context("Invalid assistant configuration")
    }

    /// Controller configuration derived from this file
    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(
            SessionConfig::new(&self.voice.public_key, self.assistant_directory()?)
                .with_language(self.voice.default_language)
                .with_ended_grace(Duration::from_millis(self.voice.ended_grace_ms)),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.voice.request_timeout_ms)
    }
}
