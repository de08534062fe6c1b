/*!
 * Translation orchestration.
 *
 * The orchestrator owns the cache and drives one request through language
 * resolution, classification, cache lookup, the backend call and the history
 * append. Manual submissions run here directly; live typing goes through a
 * `LiveSession` created from the orchestrator.
 *
 * History appends run on background tasks chained one after another, so a slow
 * store never delays a result and records still land in submission order.
 */

use anyhow::{Context, Result};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::errors::{BackendError, InputError, PersistenceError};
use crate::history::{HistoryLedger, HistoryRecord};
use crate::language_utils::LanguageTag;
use crate::providers::{BackendCall, TranslationBackend};

use super::cache::{CacheKey, TranslationCache, DEFAULT_CACHE_CAPACITY};
use super::classifier::{classify, Strategy};
use super::domain::DomainTag;
use super::request::{RequestParams, TranslationRequest};
use super::resolver::{truncate_text, LanguageResolver};
use super::scheduler::{LiveEvent, LiveSession};

/// Prefix of the text shown and recorded when a manual translation fails
pub const ERROR_PREFIX: &str = "[Error]";

/// Tunable limits of the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Quiet period before a live edit is translated
    pub debounce: Duration,
    /// Minimum trimmed length, in characters, for a live request
    pub min_live_chars: usize,
    /// Live results are recorded only when the input is longer than this
    pub min_history_chars: usize,
    /// Upper bound for one backend call
    pub request_timeout: Duration,
    /// Extra live attempts after a transient failure
    pub live_retry_count: u32,
    /// Backoff before the first live retry, doubled each time
    pub live_retry_backoff: Duration,
    /// Record failed live translations
    pub record_live_failures: bool,
    /// Record failed manual translations
    pub record_manual_failures: bool,
    pub cache_capacity: usize,
    pub cache_enabled: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            min_live_chars: 2,
            min_history_chars: 5,
            request_timeout: Duration::from_secs(30),
            live_retry_count: 0,
            live_retry_backoff: Duration::from_millis(500),
            record_live_failures: false,
            record_manual_failures: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_enabled: true,
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.live.debounce_ms),
            min_live_chars: config.live.min_chars,
            min_history_chars: config.live.history_min_chars,
            request_timeout: Duration::from_secs(config.translation.get_timeout_secs()),
            live_retry_count: config.live.retry_count,
            live_retry_backoff: Duration::from_millis(config.live.retry_backoff_ms),
            record_live_failures: config.history.record_live_failures,
            record_manual_failures: config.history.record_manual_failures,
            cache_capacity: config.cache.capacity,
            cache_enabled: config.cache.enabled,
        }
    }
}

/// A request after resolution and classification
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub text: String,
    pub source: LanguageTag,
    pub target: LanguageTag,
    pub domain: Option<DomainTag>,
    pub strategy: Strategy,
    pub key: CacheKey,
}

/// A successful translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub input: String,
    pub output: String,
    pub source: LanguageTag,
    pub target: LanguageTag,
    pub strategy: Strategy,
    pub domain: Option<DomainTag>,
    /// Served from the cache without a backend call
    pub from_cache: bool,
}

impl Translation {
    fn history_record(&self) -> HistoryRecord {
        HistoryRecord::new(self.source, self.target, &self.input, &self.output, self.domain)
    }
}

/// Final outcome of a manual submission
#[derive(Debug, Clone, PartialEq)]
pub enum ManualOutcome {
    Translated(Translation),
    Failed {
        input: String,
        error: BackendError,
    },
}

impl ManualOutcome {
    /// Text to show in the output field
    pub fn display_text(&self) -> String {
        match self {
            Self::Translated(translation) => translation.output.clone(),
            Self::Failed { error, .. } => format_error(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

fn format_error(error: &BackendError) -> String {
    format!("{} {}", ERROR_PREFIX, error)
}

struct Shared {
    backend: Arc<dyn TranslationBackend>,
    history: Arc<dyn HistoryLedger>,
    resolver: LanguageResolver,
    cache: TranslationCache,
    settings: OrchestratorSettings,
    /// Manual submissions currently running; controls are enabled at zero
    busy: AtomicUsize,
    /// Most recent history append; each append waits for the one before it
    last_append: Mutex<Option<JoinHandle<()>>>,
}

/// Entry point for translating text, manually or live
///
/// Clones share the cache, the backend and the history store.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
}

/// Keeps UI controls disabled while alive
pub struct ControlGuard {
    orchestrator: Orchestrator,
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        let remaining = self.orchestrator.shared.busy.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            debug!("Controls re-enabled");
        }
    }
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        history: Arc<dyn HistoryLedger>,
        resolver: LanguageResolver,
        settings: OrchestratorSettings,
    ) -> Self {
        let cache = TranslationCache::new(settings.cache_capacity, settings.cache_enabled);
        Self {
            shared: Arc::new(Shared {
                backend,
                history,
                resolver,
                cache,
                settings,
                busy: AtomicUsize::new(0),
                last_append: Mutex::new(None),
            }),
        }
    }

    /// Build an orchestrator from configuration, using `whatlang` for detection
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn TranslationBackend>,
        history: Arc<dyn HistoryLedger>,
    ) -> Result<Self> {
        let resolver = LanguageResolver::with_whatlang(
            config.default_language_tag().context("Invalid default_language")?,
            config.locale_tag().context("Invalid locale")?,
        );
        Ok(Self::new(backend, history, resolver, OrchestratorSettings::from_config(config)))
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.shared.cache
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.shared.settings
    }

    pub fn resolver(&self) -> &LanguageResolver {
        &self.shared.resolver
    }

    pub fn backend_name(&self) -> &str {
        self.shared.backend.name()
    }

    /// Resolve the source language, pick the strategy and compute the cache key
    pub fn prepare(&self, request: &TranslationRequest) -> PreparedRequest {
        let source = self.shared.resolver.resolve(request.source(), request.text());
        let strategy = classify(request);
        let key = CacheKey::new(request.text(), source, request.target(), request.domain());

        debug!(
            "Prepared '{}': {} -> {}, {}",
            truncate_text(request.text(), 30),
            source,
            request.target(),
            strategy
        );

        PreparedRequest {
            text: request.text().to_string(),
            source,
            target: request.target(),
            domain: request.domain(),
            strategy,
            key,
        }
    }

    /// Serve a prepared request from the cache or the backend
    ///
    /// Transient failures are retried up to `retries` times with exponential
    /// backoff. Successful backend results are cached.
    pub(crate) async fn execute(&self, prepared: &PreparedRequest, retries: u32) -> Result<Translation, BackendError> {
        let translation = |output: String, from_cache: bool| Translation {
            input: prepared.text.clone(),
            output,
            source: prepared.source,
            target: prepared.target,
            strategy: prepared.strategy,
            domain: prepared.domain,
            from_cache,
        };

        if let Some(cached) = self.shared.cache.get(&prepared.key) {
            return Ok(translation(cached, true));
        }

        let call = BackendCall::new(
            prepared.text.clone(),
            prepared.source,
            prepared.target,
            prepared.strategy,
            prepared.domain,
        );

        let mut attempt = 0;
        loop {
            match self.invoke_with_timeout(&call).await {
                Ok(output) => {
                    self.shared.cache.put(prepared.key.clone(), &output);
                    return Ok(translation(output, false));
                }
                Err(error) if error.is_transient() && attempt < retries => {
                    let backoff = self
                        .shared
                        .settings
                        .live_retry_backoff
                        .checked_mul(2u32.saturating_pow(attempt))
                        .unwrap_or(Duration::MAX);
                    attempt += 1;
                    warn!(
                        "Transient backend failure, retry {}/{} in {:?}: {}",
                        attempt, retries, backoff, error
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn invoke_with_timeout(&self, call: &BackendCall) -> Result<String, BackendError> {
        let timeout = self.shared.settings.request_timeout;
        match tokio::time::timeout(timeout, self.shared.backend.invoke(call)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::transient(format!(
                "{} call timed out after {:?}",
                self.shared.backend.name(),
                timeout
            ))),
        }
    }

    /// Queue a history append on the runtime and return at once
    ///
    /// Must be called from within a Tokio runtime. Failures are logged and
    /// swallowed.
    pub(crate) fn record(&self, record: HistoryRecord) {
        let history = Arc::clone(&self.shared.history);
        let mut last = self.shared.last_append.lock();
        let previous = last.take();

        *last = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            if let Err(e) = history.append(record).await {
                warn!("Failed to record translation in history: {}", e);
            }
        }));
    }

    pub(crate) fn record_translation(&self, translation: &Translation) {
        self.record(translation.history_record());
    }

    pub(crate) fn record_failure(&self, prepared: &PreparedRequest, error: &BackendError) {
        let record = HistoryRecord::new(
            prepared.source,
            prepared.target,
            &prepared.text,
            format_error(error),
            prepared.domain,
        );
        self.record(record);
    }

    /// Wait for every history append queued so far
    pub async fn flush_history(&self) {
        let last = self.shared.last_append.lock().take();
        if let Some(handle) = last {
            if let Err(e) = handle.await {
                warn!("History append task failed: {}", e);
            }
        }
    }

    /// Whether UI controls should be enabled
    pub fn controls_enabled(&self) -> bool {
        self.shared.busy.load(Ordering::SeqCst) == 0
    }

    fn disable_controls(&self) -> ControlGuard {
        self.shared.busy.fetch_add(1, Ordering::SeqCst);
        ControlGuard {
            orchestrator: self.clone(),
        }
    }

    /// Translate on explicit user request
    ///
    /// Bypasses debounce and makes at most one backend call. Controls are
    /// disabled for the duration and re-enabled whatever the outcome.
    pub async fn submit(&self, request: TranslationRequest) -> ManualOutcome {
        let _controls = self.disable_controls();
        let prepared = self.prepare(&request);

        info!(
            "Translating '{}' ({} -> {})",
            truncate_text(&prepared.text, 40),
            prepared.source,
            prepared.target
        );

        match self.execute(&prepared, 0).await {
            Ok(translation) => {
                self.record_translation(&translation);
                ManualOutcome::Translated(translation)
            }
            Err(error) => {
                warn!("Manual translation failed ({}): {}", error.kind, error);
                if self.shared.settings.record_manual_failures {
                    self.record_failure(&prepared, &error);
                }
                ManualOutcome::Failed {
                    input: prepared.text,
                    error,
                }
            }
        }
    }

    /// Build the request from raw text, then submit it
    pub async fn submit_text(&self, text: &str, params: RequestParams) -> Result<ManualOutcome, InputError> {
        let request = TranslationRequest::new(text, params)?;
        Ok(self.submit(request).await)
    }

    /// Start a live typing session; events arrive on the returned receiver
    ///
    /// Must be called from within a Tokio runtime. Edits may then be fed from
    /// any thread.
    pub fn live_session(&self) -> Result<(LiveSession, mpsc::UnboundedReceiver<LiveEvent>)> {
        let runtime = tokio::runtime::Handle::try_current()
            .context("Live sessions need a running Tokio runtime")?;
        Ok(LiveSession::new(self.clone(), runtime))
    }

    /// Recent history, most recent first, including appends still queued
    pub async fn history(&self, limit: usize) -> Result<Vec<HistoryRecord>, PersistenceError> {
        self.flush_history().await;
        self.shared.history.query(limit).await
    }

    pub async fn clear_history(&self) -> Result<(), PersistenceError> {
        self.flush_history().await;
        self.shared.history.clear().await
    }
}
