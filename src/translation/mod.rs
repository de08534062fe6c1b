/*!
 * Translation request orchestration.
 *
 * This module decides what to ask the backend and when. It is split into
 * several submodules:
 *
 * - `domain`: Subject domains a request can be biased toward
 * - `request`: Immutable translation requests
 * - `resolver`: Source language resolution for "auto"
 * - `classifier`: Strategy selection from text shape and domain
 * - `instructions`: Strategy-specific backend instructions
 * - `cache`: Bounded FIFO translation cache
 * - `orchestrator`: Manual submission and the shared pipeline
 * - `scheduler`: Debounced, single-flight live sessions
 */

// Re-export main types for easier usage
pub use self::cache::{CacheKey, CacheStats, TranslationCache};
pub use self::classifier::{classify, classify_text, Strategy};
pub use self::domain::DomainTag;
pub use self::instructions::{DictionaryEntry, DictionaryExample, Instruction};
pub use self::orchestrator::{
    ManualOutcome, Orchestrator, OrchestratorSettings, PreparedRequest, Translation,
};
pub use self::request::{RequestParams, TranslationRequest};
pub use self::resolver::{Detection, LanguageDetector, LanguageResolver, WhatlangDetector};
pub use self::scheduler::{LiveEvent, LiveResult, LiveSession, SessionPhase, SessionSnapshot};

// Submodules
pub mod cache;
pub mod classifier;
pub mod domain;
pub mod instructions;
pub mod orchestrator;
pub mod request;
pub mod resolver;
pub mod scheduler;
