pub mod client;
pub mod messages;

pub use client::{NatsVoiceConnection, NatsVoiceService};
pub use messages::{
    BeginSessionRequest, EndSessionRequest, SessionEventKind, SessionEventMessage, SessionReply,
};
