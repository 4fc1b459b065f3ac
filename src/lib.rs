pub mod assistant;
pub mod config;
pub mod http;
pub mod nats;
pub mod session;

pub use assistant::{AssistantDirectory, AssistantId, Language};
pub use config::Config;
pub use http::{create_router, AppState};
pub use nats::{NatsVoiceConnection, NatsVoiceService};
pub use session::{
    FailureKind, ServiceError, SessionConfig, SessionError, SessionFailure, SessionSnapshot,
    SessionState, VoiceConnection, VoiceService, VoiceSessionController,
};
