//! Localized status text derived from session state

use super::state::{FailureKind, SessionState};
use crate::assistant::Language;

/// Status line shown for `state` in the display `language`
pub fn status_text(state: SessionState, failure: Option<FailureKind>, language: Language) -> &'static str {
    match (language, state) {
        (Language::En, SessionState::Idle) => "Idle",
        (Language::En, SessionState::Connecting) => "Requesting microphone...",
        (Language::En, SessionState::Listening) => "Listening...",
        (Language::En, SessionState::Stopping) => "Stopping...",
        (Language::En, SessionState::Error) => match failure {
            Some(FailureKind::Connection) => "Failed to start",
            _ => "Error",
        },
        (Language::Ar, SessionState::Idle) => "في وضع الاستعداد",
        (Language::Ar, SessionState::Connecting) => "جارٍ طلب الميكروفون...",
        (Language::Ar, SessionState::Listening) => "يتم الاستماع...",
        (Language::Ar, SessionState::Stopping) => "جارٍ الإيقاف...",
        (Language::Ar, SessionState::Error) => match failure {
            Some(FailureKind::Connection) => "تعذّر البدء",
            _ => "حدث خطأ",
        },
    }
}

/// Usage hint shown under the microphone control
pub fn prompt_hint(language: Language) -> &'static str {
    match language {
        Language::En => "Select a language and press the mic to speak",
        Language::Ar => "اختر اللغة ثم اضغط على الزر للتحدث",
    }
}
