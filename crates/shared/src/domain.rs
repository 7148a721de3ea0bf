use std::{fmt, str::FromStr};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    pub code: &'static str,
    pub label: &'static str,
}

macro_rules! language_table {
    ($($code:literal => $label:literal),+ $(,)?) => {
        pub const SUPPORTED_LANGUAGES: &[Language] = &[
            $(Language { code: $code, label: $label },)+
        ];
    };
}

language_table! {
    "ar" => "Arabic",
    "bn" => "Bengali",
    "zh" => "Chinese",
    "nl" => "Dutch",
    "en" => "English",
    "fr" => "French",
    "de" => "German",
    "el" => "Greek",
    "gu" => "Gujarati",
    "hi" => "Hindi",
    "it" => "Italian",
    "ja" => "Japanese",
    "ko" => "Korean",
    "ml" => "Malayalam",
    "mr" => "Marathi",
    "fa" => "Persian",
    "pl" => "Polish",
    "pt" => "Portuguese",
    "pa" => "Punjabi",
    "ru" => "Russian",
    "es" => "Spanish",
    "sv" => "Swedish",
    "ta" => "Tamil",
    "te" => "Telugu",
    "th" => "Thai",
    "tr" => "Turkish",
    "ur" => "Urdu",
}

pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// A code guaranteed to be present in [`SUPPORTED_LANGUAGES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageCode(&'static Language);

impl LanguageCode {
    pub fn parse(code: &str) -> Result<Self, DomainError> {
        let code = code.trim();
        SUPPORTED_LANGUAGES
            .iter()
            .find(|language| language.code.eq_ignore_ascii_case(code))
            .map(LanguageCode)
            .ok_or_else(|| DomainError::UnknownLanguage(code.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        self.0.code
    }

    pub fn label(&self) -> &'static str {
        self.0.label
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|language| language.code == DEFAULT_LANGUAGE_CODE)
            .map(LanguageCode)
            .unwrap_or(LanguageCode(&SUPPORTED_LANGUAGES[0]))
    }
}

impl FromStr for LanguageCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const NO_CAPTIONS_VALUE: &str = "none";
const TRANSLATED_CAPTIONS_VALUE: &str = "translated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptionOption {
    #[default]
    None,
    /// Captions in whatever language the video is translated to.
    Translated,
    Language(LanguageCode),
}

impl CaptionOption {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(NO_CAPTIONS_VALUE) {
            return Ok(Self::None);
        }
        if value.eq_ignore_ascii_case(TRANSLATED_CAPTIONS_VALUE) {
            return Ok(Self::Translated);
        }
        LanguageCode::parse(value)
            .map(Self::Language)
            .map_err(|_| DomainError::UnknownCaptionOption(value.to_string()))
    }

    /// Value sent in the `caption_option` form field.
    pub fn form_value(&self) -> &'static str {
        match self {
            Self::None => NO_CAPTIONS_VALUE,
            Self::Translated => TRANSLATED_CAPTIONS_VALUE,
            Self::Language(code) => code.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "No Captions",
            Self::Translated => "Captions in Converted Language",
            Self::Language(code) => code.label(),
        }
    }
}

impl FromStr for CaptionOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CaptionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_value())
    }
}

/// Caption choices offered to the user, derived from the language table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTable {
    options: Vec<CaptionOption>,
}

impl CaptionTable {
    pub fn standard() -> Self {
        Self::excluding(&[])
    }

    /// Two sentinels followed by every supported language not listed in `excluded`.
    pub fn excluding(excluded: &[LanguageCode]) -> Self {
        let mut options = vec![CaptionOption::None, CaptionOption::Translated];
        options.extend(
            SUPPORTED_LANGUAGES
                .iter()
                .map(LanguageCode)
                .filter(|code| !excluded.contains(code))
                .map(CaptionOption::Language),
        );
        Self { options }
    }

    pub fn options(&self) -> &[CaptionOption] {
        &self.options
    }

    pub fn contains(&self, option: CaptionOption) -> bool {
        self.options.contains(&option)
    }

    /// Parses `value` and rejects options this table does not offer.
    pub fn parse(&self, value: &str) -> Result<CaptionOption, DomainError> {
        let option = CaptionOption::parse(value)?;
        if self.contains(option) {
            Ok(option)
        } else {
            Err(DomainError::UnknownCaptionOption(value.trim().to_string()))
        }
    }
}

impl Default for CaptionTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
