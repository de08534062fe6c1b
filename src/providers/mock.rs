/*!
 * Mock backend implementations for testing.
 *
 * This module provides a mock backend that simulates different behaviors:
 * - `MockBackend::working()` - Always succeeds with a tagged echo of the text
 * - `MockBackend::intermittent(n)` - Fails transiently on every nth call
 * - `MockBackend::failing_transient()` / `failing_permanent()` - Always fails
 * - `MockBackend::slow(ms)` - Succeeds after a delay
 *
 * Every call is recorded, and the peak number of overlapping calls is tracked
 * so tests can check single-flight behaviour.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::BackendError;

use super::{BackendCall, TranslationBackend};

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails transiently on every Nth call
    Intermittent { fail_every: usize },
    /// Always fails with a transient error
    FailingTransient,
    /// Always fails with a permanent error
    FailingPermanent,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock backend for testing orchestration behavior
///
/// Clones share counters and recorded calls.
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Call counter, also drives intermittent failures
    call_count: Arc<AtomicUsize>,
    /// Calls currently running
    active: Arc<AtomicUsize>,
    /// Highest value `active` reached
    peak_active: Arc<AtomicUsize>,
    /// Every call received, in order
    calls: Arc<Mutex<Vec<BackendCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&BackendCall) -> String>,
}

/// Decrements the active counter when a call ends, even if it is dropped mid-way
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            peak_active: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn failing_transient() -> Self {
        Self::new(MockBehavior::FailingTransient)
    }

    pub fn failing_permanent() -> Self {
        Self::new(MockBehavior::FailingPermanent)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&BackendCall) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Default output for a successful call
    pub fn expected_output(call: &BackendCall) -> String {
        format!("[{}] {}", call.target, call.text)
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls that ran at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    /// Copy of every call received
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    fn respond(&self, call: &BackendCall) -> String {
        match self.custom_response {
            Some(generator) => generator(call),
            None => Self::expected_output(call),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn invoke(&self, call: &BackendCall) -> Result<String, BackendError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(call.clone());

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
        let _guard = ActiveGuard(Arc::clone(&self.active));

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(call)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(BackendError::transient(format!(
                        "Simulated intermittent failure (call #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.respond(call))
                }
            }

            MockBehavior::FailingTransient => Err(BackendError::transient("Simulated network failure")),

            MockBehavior::FailingPermanent => Err(BackendError::permanent("Simulated invalid API key")),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.respond(call))
            }
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
