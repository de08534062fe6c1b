/*!
 * Integration tests for debounced live sessions.
 *
 * All tests run on a paused clock so debounce and backend delays are exact.
 */

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use livetrans::providers::MockBackend;
use livetrans::translation::{LiveEvent, SessionPhase};
use livetrans::{BackendErrorKind, OrchestratorSettings};

use crate::common::{
    en_to_vi, init_logging, orchestrator_with, test_settings, FailingLedger, RecordingLedger, SlowLedger,
};

/// Let every pending timer and call finish
async fn settle() {
    tokio::time::sleep(Duration::from_secs(60)).await;
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn drain(events: &mut UnboundedReceiver<LiveEvent>) -> Vec<LiveEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

fn translated_inputs(events: &[LiveEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            LiveEvent::Translated(result) => Some(result.input.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withRapidTyping_shouldSendOneRequest() {
    init_logging();
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    for text in ["h", "he", "hel", "hell", "hello"] {
        session.on_live_edit(text, en_to_vi());
        advance(200).await;
    }
    settle().await;

    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.calls()[0].text, "hello");
    assert_eq!(translated_inputs(&drain(&mut events)), vec!["hello".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_beforeDebounceElapses_shouldNotCall() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, _events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello", en_to_vi());
    advance(999).await;
    assert_eq!(backend.call_count(), 0);
    assert_eq!(session.phase(), SessionPhase::Pending);

    advance(2).await;
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_whileCallInFlight_shouldDropRoundAndStaySingleFlight() {
    init_logging();
    let backend = MockBackend::slow(3000);
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(backend.clone(), ledger.clone(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    advance(1100).await;
    assert_eq!(session.phase(), SessionPhase::InFlight);

    // Fires at 2100 while the first call runs until 4000
    session.on_live_edit("hello world again", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.peak_concurrency(), 1);
    assert_eq!(
        drain(&mut events),
        vec![LiveEvent::Superseded {
            input: "hello world".to_string()
        }]
    );
    assert_eq!(ledger.len(), 1);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withStaleResult_shouldOnlyDeliverCurrentText() {
    let backend = MockBackend::slow(500);
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello", en_to_vi());
    advance(1200).await;
    session.on_live_edit("hello world", en_to_vi());
    settle().await;

    let received = drain(&mut events);
    assert_eq!(
        received[0],
        LiveEvent::Superseded {
            input: "hello".to_string()
        }
    );
    assert_eq!(translated_inputs(&received), vec!["hello world".to_string()]);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.peak_concurrency(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withSlowHistory_shouldDeliverAndAcceptNextRound() {
    init_logging();
    let backend = MockBackend::working();
    let ledger = SlowLedger::new(Duration::from_secs(10));
    let orchestrator = orchestrator_with(backend.clone(), ledger.clone(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    advance(1500).await;

    assert_eq!(translated_inputs(&drain(&mut events)), vec!["hello world".to_string()]);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(ledger.len(), 0);

    session.on_live_edit("hello world again", en_to_vi());
    advance(1500).await;

    assert_eq!(backend.call_count(), 2);
    assert_eq!(
        translated_inputs(&drain(&mut events)),
        vec!["hello world again".to_string()]
    );

    settle().await;
    let recorded: Vec<String> = ledger.records().into_iter().map(|r| r.input_text).collect();
    assert_eq!(recorded, vec!["hello world", "hello world again"]);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withBrokenHistory_shouldKeepDelivering() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), FailingLedger, test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    advance(1500).await;
    session.on_live_edit("good morning", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 2);
    assert_eq!(
        translated_inputs(&drain(&mut events)),
        vec!["hello world".to_string(), "good morning".to_string()]
    );
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_waitIdle_shouldReturnOnceCallFinishes() {
    let backend = MockBackend::slow(3000);
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.wait_idle().await;

    session.on_live_edit("hello world", en_to_vi());
    let started = tokio::time::Instant::now();
    session.wait_idle().await;

    assert!(started.elapsed() >= Duration::from_millis(4000));
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(translated_inputs(&drain(&mut events)), vec!["hello world".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_waitIdle_withDroppedRound_shouldReturnAfterDebounce() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, _events) = orchestrator.live_session().unwrap();

    session.on_live_edit("a", en_to_vi());
    session.wait_idle().await;

    assert_eq!(backend.call_count(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withShortInputs_shouldOnlyRecordLongerThanFive() {
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(MockBackend::working(), ledger.clone(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("abc", en_to_vi());
    settle().await;
    session.on_live_edit("hello", en_to_vi());
    settle().await;
    assert_eq!(ledger.len(), 0);

    session.on_live_edit("hello world", en_to_vi());
    settle().await;

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.records()[0].input_text, "hello world");
    assert_eq!(translated_inputs(&drain(&mut events)).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withSingleCharacter_shouldDropRound() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("  a ", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 0);
    assert!(drain(&mut events).is_empty());
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withEmptyText_shouldClearAndCancel() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello", en_to_vi());
    advance(300).await;
    session.on_live_edit("   ", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 0);
    assert_eq!(drain(&mut events), vec![LiveEvent::Cleared]);
    assert_eq!(session.snapshot().current_text, "");
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withTransientFailure_shouldStaySilent() {
    let backend = MockBackend::failing_transient();
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(backend.clone(), ledger.clone(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 1);
    assert!(drain(&mut events).is_empty());
    assert_eq!(ledger.len(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withRetriesConfigured_shouldRetryTransientFailures() {
    let backend = MockBackend::failing_transient();
    let settings = OrchestratorSettings {
        live_retry_count: 2,
        ..test_settings()
    };
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), settings);
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 3);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_withPermanentFailure_shouldReportIt() {
    let orchestrator = orchestrator_with(MockBackend::failing_permanent(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    settle().await;

    match drain(&mut events).as_slice() {
        [LiveEvent::Failed { input, error }] => {
            assert_eq!(input, "hello world");
            assert_eq!(error.kind, BackendErrorKind::Permanent);
        }
        other => panic!("expected one failure, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_afterManualSubmit_shouldServeFromCache() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    orchestrator.submit_text("good morning everyone", en_to_vi()).await.unwrap();

    let (session, mut events) = orchestrator.live_session().unwrap();
    session.on_live_edit("good morning everyone", en_to_vi());
    settle().await;

    assert_eq!(backend.call_count(), 1);
    match drain(&mut events).as_slice() {
        [LiveEvent::Translated(result)] => {
            assert!(result.from_cache);
            assert_eq!(result.output, "[vi] good morning everyone");
        }
        other => panic!("expected a cached translation, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancelPending_shouldPreventScheduledCall() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, _events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    advance(500).await;
    session.cancel_pending();
    settle().await;

    assert_eq!(backend.call_count(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_droppedSession_shouldNotFireTimer() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, _events) = orchestrator.live_session().unwrap();

    session.on_live_edit("hello world", en_to_vi());
    drop(session);
    settle().await;

    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_liveEdit_fromAnotherThread_shouldBeAccepted() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());
    let (session, mut events) = orchestrator.live_session().unwrap();

    let editor = session.clone();
    std::thread::spawn(move || editor.on_live_edit("xin chào bạn", en_to_vi()))
        .join()
        .unwrap();
    settle().await;

    assert_eq!(translated_inputs(&drain(&mut events)), vec!["xin chào bạn".to_string()]);
}
