/*!
 * Source language resolution.
 *
 * An explicit selector is returned unchanged. "auto" runs a statistical
 * detector and, when it fails or is unsure, falls back to keyword matching:
 * the default language's keywords first, then the primary locale's. If nothing
 * matches the default language wins. Resolution never fails.
 */

use log::debug;
use std::sync::Arc;
use whatlang::Lang;

use crate::language_utils::{LanguageSelector, LanguageTag};

/// Language assumed when the detector names a language outside the supported set
pub const UNMAPPED_LANGUAGE: LanguageTag = LanguageTag::English;

/// Result of a statistical detection
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// ISO 639-1 code when one exists, the detector's own code otherwise
    pub code: String,
    /// Detector confidence between 0 and 1
    pub confidence: f64,
    /// Whether the detector trusts its answer
    pub reliable: bool,
}

/// Statistical language detector
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of the text, `None` when no guess is possible
    fn detect(&self, text: &str) -> Option<Detection>;
}

/// Detector backed by the `whatlang` trigram models
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<Detection> {
        let info = whatlang::detect(text)?;
        Some(Detection {
            code: lang_to_code(info.lang()),
            confidence: info.confidence(),
            reliable: info.is_reliable(),
        })
    }
}

fn lang_to_code(lang: Lang) -> String {
    let code = match lang {
        Lang::Vie => "vi",
        Lang::Eng => "en",
        Lang::Jpn => "ja",
        Lang::Fra => "fr",
        Lang::Cmn => "zh",
        Lang::Kor => "ko",
        Lang::Deu => "de",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Spa => "es",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        other => other.code(),
    };
    code.to_string()
}

/// Resolves "auto" selectors to a concrete language
#[derive(Clone)]
pub struct LanguageResolver {
    detector: Arc<dyn LanguageDetector>,
    default_language: LanguageTag,
    primary_locale: LanguageTag,
}

impl LanguageResolver {
    /// Create a resolver with a custom detector
    pub fn new(detector: Arc<dyn LanguageDetector>, default_language: LanguageTag, primary_locale: LanguageTag) -> Self {
        Self {
            detector,
            default_language,
            primary_locale,
        }
    }

    /// Create a resolver using `whatlang`
    pub fn with_whatlang(default_language: LanguageTag, primary_locale: LanguageTag) -> Self {
        Self::new(Arc::new(WhatlangDetector), default_language, primary_locale)
    }

    pub fn default_language(&self) -> LanguageTag {
        self.default_language
    }

    pub fn primary_locale(&self) -> LanguageTag {
        self.primary_locale
    }

    /// Resolve a selector against the text it applies to
    pub fn resolve(&self, selector: LanguageSelector, text: &str) -> LanguageTag {
        match selector {
            LanguageSelector::Fixed(tag) => tag,
            LanguageSelector::Auto => self.detect(text),
        }
    }

    fn detect(&self, text: &str) -> LanguageTag {
        match self.detector.detect(text) {
            Some(detection) if detection.reliable => {
                let tag = LanguageTag::from_code(&detection.code).unwrap_or(UNMAPPED_LANGUAGE);
                debug!(
                    "Detected {} ({:.2}) for '{}', resolved to {}",
                    detection.code,
                    detection.confidence,
                    truncate_text(text, 30),
                    tag
                );
                tag
            }
            Some(detection) => {
                debug!(
                    "Unreliable detection {} ({:.2}), using keyword fallback",
                    detection.code, detection.confidence
                );
                self.keyword_fallback(text)
            }
            None => {
                debug!("No detection for '{}', using keyword fallback", truncate_text(text, 30));
                self.keyword_fallback(text)
            }
        }
    }

    fn keyword_fallback(&self, text: &str) -> LanguageTag {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        [self.default_language, self.primary_locale]
            .into_iter()
            .find(|tag| {
                tag.keywords()
                    .iter()
                    .any(|keyword| words.iter().any(|word| word == keyword))
            })
            .unwrap_or(self.default_language)
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
