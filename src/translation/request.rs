/*!
 * Translation requests built per user action.
 */

use crate::errors::InputError;
use crate::language_utils::{LanguageSelector, LanguageTag};

use super::domain::DomainTag;

/// Language and domain choices that accompany the text of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParams {
    /// Source selector, possibly "auto"
    pub source: LanguageSelector,
    /// Target language
    pub target: LanguageTag,
    /// Domain, `None` when the user did not pick one
    pub domain: Option<DomainTag>,
}

impl RequestParams {
    pub fn new(source: LanguageSelector, target: LanguageTag, domain: Option<DomainTag>) -> Self {
        Self { source, target, domain }
    }
}

/// An immutable translation request
///
/// The text is always trimmed and non-empty; construction rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    raw_text: String,
    params: RequestParams,
}

impl TranslationRequest {
    /// Build a request, trimming the text
    pub fn new(text: &str, params: RequestParams) -> Result<Self, InputError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyText);
        }

        Ok(Self {
            raw_text: trimmed.to_string(),
            params,
        })
    }

    pub fn text(&self) -> &str {
        &self.raw_text
    }

    pub fn source(&self) -> LanguageSelector {
        self.params.source
    }

    pub fn target(&self) -> LanguageTag {
        self.params.target
    }

    pub fn domain(&self) -> Option<DomainTag> {
        self.params.domain
    }

    pub fn params(&self) -> RequestParams {
        self.params
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.raw_text.chars().count()
    }
}
