/*!
 * Backend implementations for the external translation capability.
 *
 * This module contains client implementations for the supported backends:
 * - Gemini: Google Generative Language API
 * - OpenAI: OpenAI chat completions API
 * - Mock: scripted behaviours for tests and offline runs
 *
 * Backends are stateless between calls and never retry; retry policy belongs
 * to the caller.
 */

use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::BackendError;
use crate::language_utils::LanguageTag;
use crate::translation::{DomainTag, Instruction, Strategy};

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockBehavior};
pub use openai::OpenAIBackend;

/// Everything a backend needs for one translation
#[derive(Debug, Clone, PartialEq)]
pub struct BackendCall {
    /// Trimmed text to translate
    pub text: String,
    /// Resolved source language
    pub source: LanguageTag,
    /// Target language
    pub target: LanguageTag,
    /// Strategy picked by the classifier
    pub strategy: Strategy,
    /// Selected domain
    pub domain: Option<DomainTag>,
    /// Instruction built for the strategy
    pub instruction: Instruction,
}

impl BackendCall {
    /// Build a call, deriving the instruction from the other fields
    pub fn new(
        text: impl Into<String>,
        source: LanguageTag,
        target: LanguageTag,
        strategy: Strategy,
        domain: Option<DomainTag>,
    ) -> Self {
        let text = text.into();
        let instruction = Instruction::build(&text, source, target, strategy, domain);
        Self {
            text,
            source,
            target,
            strategy,
            domain,
            instruction,
        }
    }
}

/// Common trait for all translation backends
///
/// This trait defines the interface that all backend implementations must follow,
/// allowing them to be used interchangeably by the orchestrator.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate one call
    ///
    /// # Returns
    /// * `Result<String, BackendError>` - The translated text, or a transient/permanent error
    async fn invoke(&self, call: &BackendCall) -> Result<String, BackendError>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

/// Map a non-success HTTP status to a backend error
///
/// Credential and request-shape failures are permanent; rate limits, timeouts
/// and server errors are transient.
pub fn error_for_status(backend: &str, status: StatusCode, body: &str) -> BackendError {
    let message = format!("{} API error ({}): {}", backend, status, body.trim());
    match status.as_u16() {
        400 | 401 | 403 | 404 => BackendError::permanent(message),
        408 | 429 => BackendError::transient(message),
        code if code >= 500 => BackendError::transient(message),
        _ => BackendError::permanent(message),
    }
}

/// Map a transport error; these are always transient
///
/// The URL is stripped first since Gemini carries the API key in its query.
pub fn error_for_transport(backend: &str, error: reqwest::Error) -> BackendError {
    let error = error.without_url();
    if error.is_timeout() {
        BackendError::transient(format!("{} request timed out: {}", backend, error))
    } else {
        BackendError::transient(format!("Failed to send request to {} API: {}", backend, error))
    }
}

/// Map a failure to decode a response body; URL stripped as above
pub fn error_for_decode(backend: &str, error: reqwest::Error) -> BackendError {
    BackendError::transient(format!("Failed to parse {} API response: {}", backend, error.without_url()))
}

/// Create the backend named by the configuration
pub fn create_backend(config: &TranslationConfig) -> Arc<dyn TranslationBackend> {
    let timeout = Duration::from_secs(config.get_timeout_secs());
    let temperature = config.common.temperature;

    match config.provider {
        TranslationProvider::Gemini => Arc::new(GeminiBackend::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            temperature,
            timeout,
        )),
        TranslationProvider::OpenAI => Arc::new(OpenAIBackend::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            temperature,
            timeout,
        )),
        TranslationProvider::Mock => Arc::new(MockBackend::working()),
    }
}
