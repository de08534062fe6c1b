/*!
 * # livetrans - Translation Request Orchestrator
 *
 * A Rust library that sits between a desktop translation assistant's input
 * field and a cloud language backend.
 *
 * ## Features
 *
 * - Auto-detection of the source language with keyword fallback
 * - One translation strategy per request: literal sentence, domain-adapted
 *   sentence, slang, idiom or dictionary-style lookup
 * - Debounced, single-flight live translation with stale-result suppression
 * - Bounded FIFO translation cache
 * - SQLite history with export
 * - Backends:
 *   - Google Gemini
 *   - OpenAI API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Request orchestration:
 *   - `translation::resolver`: Source language resolution
 *   - `translation::classifier`: Strategy selection
 *   - `translation::cache`: FIFO translation cache
 *   - `translation::orchestrator`: Manual submission pipeline
 *   - `translation::scheduler`: Live typing sessions
 * - `providers`: Backend clients:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::mock`: Scripted backend for tests
 * - `history`: Persisted translation history
 * - `language_utils`: Supported languages and collaborator codes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod history;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, BackendError, BackendErrorKind, InputError, PersistenceError};
pub use history::{HistoryLedger, HistoryRecord, HistoryRepository};
pub use language_utils::{get_language_name, swap_languages, LanguageSelector, LanguageTag};
pub use providers::{create_backend, BackendCall, TranslationBackend};
pub use translation::{
    DomainTag, LiveEvent, LiveSession, ManualOutcome, Orchestrator, OrchestratorSettings,
    RequestParams, Strategy, TranslationRequest,
};
