//! Language codes accepted by the cloning model.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::voice_error::VoiceError;

/// Closed set of languages the multilingual model was trained on.
///
/// Wire format is the lowercase model code (`"en"`, `"zh-cn"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Language {
    /// English
    #[default]
    English,
    /// Spanish
    Spanish,
    /// French
    French,
    /// German
    German,
    /// Italian
    Italian,
    /// Portuguese
    Portuguese,
    /// Polish
    Polish,
    /// Turkish
    Turkish,
    /// Russian
    Russian,
    /// Dutch
    Dutch,
    /// Czech
    Czech,
    /// Arabic
    Arabic,
    /// Chinese (Simplified)
    ChineseSimplified,
    /// Japanese
    Japanese,
    /// Hungarian
    Hungarian,
    /// Korean
    Korean,
}

impl Language {
    /// Every supported language, in the order advertised by `/api/tts/info`.
    pub const ALL: [Self; 16] = [
        Self::English,
        Self::Spanish,
        Self::French,
        Self::German,
        Self::Italian,
        Self::Portuguese,
        Self::Polish,
        Self::Turkish,
        Self::Russian,
        Self::Dutch,
        Self::Czech,
        Self::Arabic,
        Self::ChineseSimplified,
        Self::Japanese,
        Self::Hungarian,
        Self::Korean,
    ];

    /// Get the model's language code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Polish => "pl",
            Self::Turkish => "tr",
            Self::Russian => "ru",
            Self::Dutch => "nl",
            Self::Czech => "cs",
            Self::Arabic => "ar",
            Self::ChineseSimplified => "zh-cn",
            Self::Japanese => "ja",
            Self::Hungarian => "hu",
            Self::Korean => "ko",
        }
    }

    /// All supported codes, for discovery endpoints.
    pub fn codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.code()).collect()
    }
}

impl FromStr for Language {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| VoiceError::UnsupportedLanguage(wanted.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = VoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for &'static str {
    fn from(value: Language) -> Self {
        value.code()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
