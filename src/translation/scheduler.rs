/*!
 * Realtime scheduling for live typing.
 *
 * Each session moves through `Idle -> Pending -> InFlight -> Idle`. Every edit
 * re-arms a debounce timer; when the timer fires the session translates the
 * current text unless it is too short or a call is already in flight, in which
 * case the round is dropped. A monotonic generation counter guards the timers
 * so a superseded timer can never start work. Results that no longer match the
 * session's current text are reported as superseded instead of delivered.
 *
 * Edits may come from any thread; timers and backend calls run on the Tokio
 * runtime captured when the session was created.
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::errors::BackendError;
use crate::language_utils::LanguageTag;

use super::classifier::Strategy;
use super::domain::DomainTag;
use super::orchestrator::Orchestrator;
use super::request::{RequestParams, TranslationRequest};
use super::resolver::truncate_text;

/// Where a session is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing scheduled or running
    Idle,
    /// A debounce timer is armed
    Pending,
    /// A backend call is running
    InFlight,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub generation: u64,
    pub current_text: String,
    pub pending: bool,
    pub in_flight: bool,
}

/// A live translation ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct LiveResult {
    pub input: String,
    pub output: String,
    pub source: LanguageTag,
    pub target: LanguageTag,
    pub strategy: Strategy,
    pub domain: Option<DomainTag>,
    pub from_cache: bool,
}

/// Notifications sent to the UI side of a session
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// The input became empty; clear the output field
    Cleared,
    /// A translation for the current text
    Translated(LiveResult),
    /// A translation finished after the text had changed; not for display
    Superseded { input: String },
    /// A permanent backend failure; the output field keeps its content
    Failed { input: String, error: BackendError },
}

#[derive(Default)]
struct SessionState {
    generation: u64,
    current_text: String,
    params: Option<RequestParams>,
    timer: Option<JoinHandle<()>>,
    in_flight: bool,
}

impl SessionState {
    fn is_current(&self, request: &TranslationRequest) -> bool {
        self.current_text == request.text() && self.params == Some(request.params())
    }
}

struct SessionInner {
    orchestrator: Orchestrator,
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<LiveEvent>,
    runtime: Handle,
    /// Woken whenever the session may have become idle
    idle: Notify,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.abort();
        }
    }
}

/// Clears the in-flight flag if the worker ends without reaching `release`
struct InFlightGuard {
    inner: Arc<SessionInner>,
    released: bool,
}

impl InFlightGuard {
    fn release(&mut self, state: &mut SessionState) {
        state.in_flight = false;
        self.released = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.released {
            self.inner.state.lock().in_flight = false;
            self.inner.idle.notify_waiters();
        }
    }
}

/// One live typing session
///
/// Clones refer to the same session.
#[derive(Clone)]
pub struct LiveSession {
    inner: Arc<SessionInner>,
}

impl LiveSession {
    pub(crate) fn new(orchestrator: Orchestrator, runtime: Handle) -> (Self, mpsc::UnboundedReceiver<LiveEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = Self {
            inner: Arc::new(SessionInner {
                orchestrator,
                state: Mutex::new(SessionState::default()),
                events,
                runtime,
                idle: Notify::new(),
            }),
        };
        (session, receiver)
    }

    /// Handle a keystroke-level change of the input field
    pub fn on_live_edit(&self, text: &str, params: RequestParams) {
        let trimmed = text.trim();
        let mut state = self.inner.state.lock();

        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.current_text = trimmed.to_string();
        state.params = Some(params);

        if trimmed.is_empty() {
            drop(state);
            self.inner.idle.notify_waiters();
            debug!("Live input cleared");
            self.emit(LiveEvent::Cleared);
            return;
        }

        let generation = state.generation;
        let debounce = self.inner.orchestrator.settings().debounce;
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);

        state.timer = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(inner) = weak.upgrade() {
                LiveSession { inner }.fire(generation);
            }
        }));
    }

    /// Debounce timer expiry for `generation`
    fn fire(&self, generation: u64) {
        self.start_round(generation);
        self.inner.idle.notify_waiters();
    }

    fn start_round(&self, generation: u64) {
        let mut state = self.inner.state.lock();

        if state.generation != generation {
            debug!("Timer for generation {} superseded", generation);
            return;
        }
        state.timer = None;

        let min_chars = self.inner.orchestrator.settings().min_live_chars;
        if state.current_text.chars().count() < min_chars {
            debug!("Live round dropped: '{}' is shorter than {} chars", state.current_text, min_chars);
            return;
        }

        if state.in_flight {
            debug!("Live round dropped: a call is already in flight");
            return;
        }

        let Some(params) = state.params else {
            return;
        };
        let request = match TranslationRequest::new(&state.current_text, params) {
            Ok(request) => request,
            Err(e) => {
                debug!("Live round dropped: {}", e);
                return;
            }
        };

        state.in_flight = true;
        drop(state);

        let session = self.clone();
        self.inner.runtime.spawn(async move {
            session.run(request).await;
        });
    }

    /// Worker body: translate, deliver if still current, then queue the record
    ///
    /// The in-flight flag is released before anything is delivered or recorded
    /// so history never holds up the next round.
    async fn run(self, request: TranslationRequest) {
        let mut guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            released: false,
        };
        let orchestrator = &self.inner.orchestrator;
        let settings = orchestrator.settings().clone();

        let prepared = orchestrator.prepare(&request);
        let result = orchestrator.execute(&prepared, settings.live_retry_count).await;

        match result {
            Ok(translation) => {
                let current = {
                    let mut state = self.inner.state.lock();
                    guard.release(&mut state);
                    state.is_current(&request)
                };
                let to_record = (request.char_len() > settings.min_history_chars).then(|| translation.clone());

                if current {
                    info!(
                        "Live translation ready for '{}'",
                        truncate_text(&translation.input, 30)
                    );
                    self.emit(LiveEvent::Translated(LiveResult {
                        input: translation.input,
                        output: translation.output,
                        source: translation.source,
                        target: translation.target,
                        strategy: translation.strategy,
                        domain: translation.domain,
                        from_cache: translation.from_cache,
                    }));
                } else {
                    debug!("Discarding stale result for '{}'", truncate_text(&translation.input, 30));
                    self.emit(LiveEvent::Superseded {
                        input: translation.input,
                    });
                }

                if let Some(translation) = to_record {
                    orchestrator.record_translation(&translation);
                }
            }
            Err(error) => {
                {
                    let mut state = self.inner.state.lock();
                    guard.release(&mut state);
                }

                if settings.record_live_failures {
                    orchestrator.record_failure(&prepared, &error);
                }

                if error.is_transient() {
                    warn!("Live translation dropped after transient failure: {}", error);
                } else {
                    warn!("Live translation failed: {}", error);
                    self.emit(LiveEvent::Failed {
                        input: prepared.text,
                        error,
                    });
                }
            }
        }
        self.inner.idle.notify_waiters();
    }

    fn emit(&self, event: LiveEvent) {
        if self.inner.events.send(event).is_err() {
            debug!("Live event receiver dropped");
        }
    }

    /// Cancel a pending timer without touching an in-flight call
    pub fn cancel_pending(&self) {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        drop(state);
        self.inner.idle.notify_waiters();
    }

    /// Wait until no timer is armed and no call is running
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.phase() == SessionPhase::Idle {
                return;
            }
            notified.await;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock();
        let pending = state.timer.is_some();
        let phase = if state.in_flight {
            SessionPhase::InFlight
        } else if pending {
            SessionPhase::Pending
        } else {
            SessionPhase::Idle
        };

        SessionSnapshot {
            phase,
            generation: state.generation,
            current_text: state.current_text.clone(),
            pending,
            in_flight: state.in_flight,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.snapshot().phase
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }
}
