//! Language selection and assistant resolution
//!
//! Each supported language is bound to exactly one remote assistant. The
//! table is supplied by configuration and is fixed for the life of the
//! process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::session::SessionError;

/// Conversation language selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default)
    #[default]
    En,
    /// Arabic
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    /// Short language code ("en" / "ar")
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Native display name for language pickers
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية",
        }
    }

    /// Whether text in this language is laid out right-to-left
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            other => Err(SessionError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Opaque identifier of a remote assistant configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssistantId(String);

impl AssistantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssistantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Language → assistant mapping
#[derive(Debug, Clone)]
pub struct AssistantDirectory {
    english: AssistantId,
    arabic: AssistantId,
}

impl AssistantDirectory {
    /// Build the table, rejecting blank identifiers
    pub fn new(english: impl Into<String>, arabic: impl Into<String>) -> Result<Self, SessionError> {
        Ok(Self {
            english: Self::validate(Language::En, english.into())?,
            arabic: Self::validate(Language::Ar, arabic.into())?,
        })
    }

    /// Assistant to use for a session in `language`
    pub fn resolve(&self, language: Language) -> &AssistantId {
        match language {
            Language::En => &self.english,
            Language::Ar => &self.arabic,
        }
    }

    fn validate(language: Language, id: String) -> Result<AssistantId, SessionError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SessionError::Resolution(language));
        }
        Ok(AssistantId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_language_to_its_own_assistant() {
        let directory = AssistantDirectory::new("assistant-en", "assistant-ar").unwrap();

        assert_eq!(directory.resolve(Language::En).as_str(), "assistant-en");
        assert_eq!(directory.resolve(Language::Ar).as_str(), "assistant-ar");
    }

    #[test]
    fn blank_assistant_id_is_a_resolution_error() {
        let err = AssistantDirectory::new("assistant-en", "  ").unwrap_err();
        assert!(matches!(err, SessionError::Resolution(Language::Ar)));
    }

    #[test]
    fn language_parses_codes_and_names() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" arabic ".parse::<Language>().unwrap(), Language::Ar);
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(SessionError::UnknownLanguage(code)) if code == "fr"
        ));
    }

    #[test]
    fn only_arabic_is_right_to_left() {
        assert!(Language::Ar.is_rtl());
        assert!(!Language::En.is_rtl());
        assert_eq!(Language::default(), Language::En);
    }
}
