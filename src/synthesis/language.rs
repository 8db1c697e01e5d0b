//! Languages accepted by the synthesis service.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ISO 639-1 code sent in the `language` multipart field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// All selectable languages, in the order the UI lists them.
    pub const ALL: [Language; 2] = [Language::Turkish, Language::English];

    /// Wire code sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Turkish => "tr",
            Language::English => "en",
        }
    }

    /// Label shown in the language selector.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Turkish => "Turkish",
            Language::English => "English",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tr" => Ok(Language::Turkish),
            "en" => Ok(Language::English),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Returned when parsing a code outside the supported set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unsupported language code: {0:?}")]
pub struct UnknownLanguage(pub String);
