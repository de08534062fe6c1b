use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language utilities for the supported language set
///
/// This module defines the fixed set of languages the assistant can translate
/// between, the "auto" selector sentinel, and the codes that upstream
/// collaborators (OCR, speech recognition) expect for each language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LanguageTag {
    Vietnamese,
    English,
    Japanese,
    French,
    Chinese,
    Korean,
    German,
    Thai,
    Indonesian,
    Spanish,
    Italian,
    Portuguese,
    Russian,
    Arabic,
    Hindi,
}

impl LanguageTag {
    /// Every supported language, in menu order
    pub const ALL: [LanguageTag; 15] = [
        LanguageTag::Vietnamese,
        LanguageTag::English,
        LanguageTag::Japanese,
        LanguageTag::French,
        LanguageTag::Chinese,
        LanguageTag::Korean,
        LanguageTag::German,
        LanguageTag::Thai,
        LanguageTag::Indonesian,
        LanguageTag::Spanish,
        LanguageTag::Italian,
        LanguageTag::Portuguese,
        LanguageTag::Russian,
        LanguageTag::Arabic,
        LanguageTag::Hindi,
    ];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vietnamese => "vi",
            Self::English => "en",
            Self::Japanese => "ja",
            Self::French => "fr",
            Self::Chinese => "zh",
            Self::Korean => "ko",
            Self::German => "de",
            Self::Thai => "th",
            Self::Indonesian => "id",
            Self::Spanish => "es",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Russian => "ru",
            Self::Arabic => "ar",
            Self::Hindi => "hi",
        }
    }

    /// Look up a language by its ISO 639-1 code
    ///
    /// This is the fixed table detector output is mapped through.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::ALL.iter().copied().find(|tag| tag.code() == code)
    }

    /// English name of the language, as sent to the backend
    pub fn english_name(&self) -> &'static str {
        Language::from_639_1(self.code())
            .map(|lang| lang.to_name())
            .unwrap_or_else(|| self.code())
    }

    /// Tesseract language pack used when OCR feeds text in this language
    pub fn ocr_language(&self) -> &'static str {
        match self {
            Self::Vietnamese => "vie",
            Self::English => "eng",
            Self::Japanese => "jpn",
            Self::Chinese => "chi_sim",
            Self::Korean => "kor",
            _ => MIXED_OCR_LANGUAGE,
        }
    }

    /// Locale used by the speech recognizer for this language
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Self::Vietnamese => "vi-VN",
            Self::English => "en-US",
            Self::Chinese => "zh-CN",
            Self::Japanese => "ja-JP",
            Self::Korean => "ko-KR",
            Self::French => "fr-FR",
            Self::German => "de-DE",
            Self::Spanish => "es-ES",
            Self::Italian => "it-IT",
            Self::Portuguese => "pt-BR",
            Self::Russian => "ru-RU",
            Self::Arabic => "ar-SA",
            Self::Thai => "th-TH",
            Self::Indonesian => "id-ID",
            Self::Hindi => "hi-IN",
        }
    }

    /// Common words used to guess the language when statistical detection fails
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::English => &[
                "hello", "hi", "how", "what", "where", "when", "why", "the", "and", "or",
            ],
            Self::Vietnamese => &[
                "xin", "chào", "là", "của", "và", "có", "tôi", "bạn", "này", "đó",
            ],
            Self::French => &["bonjour", "le", "la", "les", "et", "est", "je", "vous"],
            Self::German => &["hallo", "der", "die", "das", "und", "ist", "ich", "nicht"],
            Self::Spanish => &["hola", "el", "los", "las", "y", "es", "yo", "que"],
            _ => &[],
        }
    }
}

/// OCR pack used when the source language is unknown
pub const MIXED_OCR_LANGUAGE: &str = "vie+eng";

/// Speech locale used when the source language is unknown
pub const DEFAULT_SPEECH_LOCALE: &str = "en-US";

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LanguageTag {
    type Err = anyhow::Error;

    /// Accepts an ISO 639-1 code or an English language name
    fn from_str(s: &str) -> Result<Self> {
        if let Some(tag) = Self::from_code(s) {
            return Ok(tag);
        }

        let name = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.english_name().to_lowercase() == name)
            .ok_or_else(|| anyhow!("Unsupported language: {}", s))
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.code().to_string()
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Source language selection: either a concrete language or auto-detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageSelector {
    #[default]
    Auto,
    Fixed(LanguageTag),
}

/// Selector string for auto-detection
pub const AUTO_SELECTOR: &str = "auto";

impl LanguageSelector {
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The concrete language, if one was selected
    pub fn fixed(&self) -> Option<LanguageTag> {
        match self {
            Self::Auto => None,
            Self::Fixed(tag) => Some(*tag),
        }
    }
}

impl fmt::Display for LanguageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "{}", AUTO_SELECTOR),
            Self::Fixed(tag) => write!(f, "{}", tag),
        }
    }
}

impl FromStr for LanguageSelector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(AUTO_SELECTOR) || trimmed.eq_ignore_ascii_case("auto detect") {
            return Ok(Self::Auto);
        }
        Ok(Self::Fixed(trimmed.parse()?))
    }
}

impl From<LanguageTag> for LanguageSelector {
    fn from(tag: LanguageTag) -> Self {
        Self::Fixed(tag)
    }
}

/// Swap source and target languages
///
/// Auto-detect cannot become a target, so swapping is refused while the
/// source selector is "auto".
pub fn swap_languages(source: LanguageSelector, target: LanguageTag) -> Option<(LanguageSelector, LanguageTag)> {
    source
        .fixed()
        .map(|source_tag| (LanguageSelector::Fixed(target), source_tag))
}

/// OCR language pack for a source selector
pub fn ocr_language_for(selector: LanguageSelector) -> &'static str {
    selector
        .fixed()
        .map(|tag| tag.ocr_language())
        .unwrap_or(MIXED_OCR_LANGUAGE)
}

/// Speech recognition locale for a source selector
pub fn speech_locale_for(selector: LanguageSelector) -> &'static str {
    selector
        .fixed()
        .map(|tag| tag.speech_locale())
        .unwrap_or(DEFAULT_SPEECH_LOCALE)
}

/// Check that a configured language code is supported
pub fn validate_language_code(code: &str) -> Result<LanguageTag> {
    LanguageTag::from_code(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let tag = validate_language_code(code)?;
    Ok(tag.english_name().to_string())
}
