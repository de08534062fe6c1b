/*!
 * Request classification.
 *
 * Every request is mapped to exactly one translation strategy, based on the
 * selected domain and the shape of the text. The rules are evaluated in order
 * and the first match wins:
 *
 * 1. Slang domain: slang interpretation
 * 2. Idiom domain: idiom interpretation
 * 3. Three or more whitespace tokens: domain-adapted sentence for professional
 *    domains, literal sentence otherwise
 * 4. One or two tokens made only of letters: dictionary lookup
 * 5. Anything else: literal sentence
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::DomainTag;
use super::request::TranslationRequest;

/// Minimum number of tokens for a text to be treated as a sentence
pub const SENTENCE_MIN_TOKENS: usize = 3;

/// How a request is translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Plain sentence translation
    LiteralSentence,
    /// Sentence translation using domain terminology
    DomainSentence,
    /// Interpretation of slang
    SlangPhrase,
    /// Interpretation of an idiom
    IdiomPhrase,
    /// Dictionary-style explanation of a word or two-word term
    DictionaryLookup,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LiteralSentence => "literal sentence",
            Self::DomainSentence => "domain sentence",
            Self::SlangPhrase => "slang phrase",
            Self::IdiomPhrase => "idiom phrase",
            Self::DictionaryLookup => "dictionary lookup",
        };
        write!(f, "{}", name)
    }
}

/// Choose the strategy for a request
pub fn classify(request: &TranslationRequest) -> Strategy {
    classify_text(request.text(), request.domain())
}

/// Choose the strategy for raw text and a domain
///
/// The text is expected to be non-empty; callers go through
/// `TranslationRequest::new` which guarantees it.
pub fn classify_text(text: &str, domain: Option<DomainTag>) -> Strategy {
    match domain {
        Some(DomainTag::Slang) => return Strategy::SlangPhrase,
        Some(DomainTag::Idiom) => return Strategy::IdiomPhrase,
        _ => {}
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();

    if tokens.len() >= SENTENCE_MIN_TOKENS {
        return match domain {
            Some(tag) if tag.is_professional() => Strategy::DomainSentence,
            _ => Strategy::LiteralSentence,
        };
    }

    if tokens.iter().all(|token| is_alphabetic_token(token)) {
        Strategy::DictionaryLookup
    } else {
        Strategy::LiteralSentence
    }
}

fn is_alphabetic_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}
