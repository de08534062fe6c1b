/*!
 * Integration tests for manual submission through the orchestrator.
 *
 * Every test runs the full path: resolution, classification, cache, backend
 * and history.
 */

use std::time::Duration;

use futures::future::join_all;

use livetrans::providers::MockBackend;
use livetrans::translation::CacheKey;
use livetrans::{BackendErrorKind, DomainTag, LanguageTag, ManualOutcome, OrchestratorSettings, Strategy};

use crate::common::{
    auto_to_vi, en_to_vi, orchestrator_with, test_settings, FailingLedger, RecordingLedger, SlowLedger,
};

#[tokio::test]
async fn test_submit_withSingleWordAuto_shouldUseDictionaryLookup() {
    let backend = MockBackend::working();
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(backend.clone(), ledger.clone(), test_settings());

    let outcome = orchestrator
        .submit_text("love", auto_to_vi(Some(DomainTag::General)))
        .await
        .unwrap();

    let ManualOutcome::Translated(translation) = outcome else {
        panic!("expected a translation");
    };
    assert_eq!(translation.strategy, Strategy::DictionaryLookup);
    assert_eq!(translation.source, LanguageTag::English);
    assert_eq!(translation.output, "[vi] love");

    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.calls()[0].instruction.user, "Word: love");

    let key = CacheKey::new("love", LanguageTag::English, LanguageTag::Vietnamese, Some(DomainTag::General));
    assert!(orchestrator.cache().contains(&key));
    orchestrator.flush_history().await;
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn test_submit_withTechnicalSentence_shouldUseDomainStrategy() {
    let backend = MockBackend::working();
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(backend.clone(), ledger.clone(), test_settings());

    let outcome = orchestrator
        .submit_text("The database server crashed last night", auto_to_vi(Some(DomainTag::Technical)))
        .await
        .unwrap();

    assert!(outcome.is_success());
    let call = &backend.calls()[0];
    assert_eq!(call.strategy, Strategy::DomainSentence);
    assert!(call.instruction.system.contains("Technical/IT"));

    orchestrator.flush_history().await;
    let records = ledger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].domain, Some(DomainTag::Technical));
    assert_eq!(records[0].input_text, "The database server crashed last night");
}

#[tokio::test]
async fn test_submit_withSlangDomain_shouldInterpretSlang() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());

    orchestrator
        .submit_text("lit", auto_to_vi(Some(DomainTag::Slang)))
        .await
        .unwrap();

    let call = &backend.calls()[0];
    assert_eq!(call.strategy, Strategy::SlangPhrase);
    assert_eq!(call.instruction.user, "Slang: lit");
}

#[tokio::test]
async fn test_submit_withPermanentFailure_shouldShowAndRecordError() {
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(MockBackend::failing_permanent(), ledger.clone(), test_settings());

    let outcome = orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();

    match &outcome {
        ManualOutcome::Failed { input, error } => {
            assert_eq!(input, "good morning");
            assert_eq!(error.kind, BackendErrorKind::Permanent);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(outcome.display_text(), "[Error] Simulated invalid API key");
    orchestrator.flush_history().await;
    assert_eq!(ledger.records()[0].output_text, "[Error] Simulated invalid API key");
    assert!(orchestrator.controls_enabled());
    assert!(orchestrator.cache().is_empty());
}

#[tokio::test]
async fn test_submit_withFailureRecordingDisabled_shouldNotRecord() {
    let ledger = RecordingLedger::new();
    let settings = OrchestratorSettings {
        record_manual_failures: false,
        ..test_settings()
    };
    let orchestrator = orchestrator_with(MockBackend::failing_transient(), ledger.clone(), settings);

    let outcome = orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();

    assert!(!outcome.is_success());
    orchestrator.flush_history().await;
    assert_eq!(ledger.len(), 0);
}

#[tokio::test]
async fn test_submit_withBrokenHistory_shouldStillDeliver() {
    let orchestrator = orchestrator_with(MockBackend::working(), FailingLedger, test_settings());

    let outcome = orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();

    assert_eq!(outcome.display_text(), "[vi] good morning");
    assert!(orchestrator.history(10).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_submit_withSlowHistory_shouldReturnBeforeAppendFinishes() {
    let ledger = SlowLedger::new(Duration::from_secs(10));
    let orchestrator = orchestrator_with(MockBackend::working(), ledger.clone(), test_settings());

    let started = tokio::time::Instant::now();
    let outcome = orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();

    assert_eq!(outcome.display_text(), "[vi] good morning");
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(orchestrator.controls_enabled());
    assert_eq!(ledger.len(), 0);

    let next = orchestrator.submit_text("good night", en_to_vi()).await.unwrap();
    assert!(next.is_success());
    assert!(started.elapsed() < Duration::from_secs(1));

    orchestrator.flush_history().await;
    let inputs: Vec<String> = ledger.records().into_iter().map(|r| r.input_text).collect();
    assert_eq!(inputs, vec!["good morning", "good night"]);
}

#[tokio::test]
async fn test_submit_withBrokenHistory_shouldDeliverEverySubmission() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), FailingLedger, test_settings());

    for text in ["good morning", "good night"] {
        let outcome = orchestrator.submit_text(text, en_to_vi()).await.unwrap();
        assert_eq!(outcome.display_text(), format!("[vi] {}", text));
    }
    orchestrator.flush_history().await;

    assert_eq!(backend.call_count(), 2);
    assert!(orchestrator.controls_enabled());
}

#[tokio::test(start_paused = true)]
async fn test_submit_withHangingBackend_shouldTimeOutAsTransient() {
    let backend = MockBackend::slow(120_000);
    let orchestrator = orchestrator_with(backend, RecordingLedger::new(), test_settings());

    let outcome = orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();

    match outcome {
        ManualOutcome::Failed { error, .. } => {
            assert!(error.is_transient());
            assert!(error.message.contains("timed out"));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(orchestrator.controls_enabled());
}

#[tokio::test(start_paused = true)]
async fn test_submit_whileRunning_shouldDisableControls() {
    let orchestrator = orchestrator_with(MockBackend::slow(500), RecordingLedger::new(), test_settings());

    let running = orchestrator.clone();
    let handle = tokio::spawn(async move { running.submit_text("good morning", en_to_vi()).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!orchestrator.controls_enabled());

    let outcome = handle.await.unwrap().unwrap();
    assert!(outcome.is_success());
    assert!(orchestrator.controls_enabled());
}

#[tokio::test]
async fn test_submit_withCacheDisabled_shouldCallEveryTime() {
    let backend = MockBackend::working();
    let settings = OrchestratorSettings {
        cache_enabled: false,
        ..test_settings()
    };
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), settings);

    orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();
    orchestrator.submit_text("good morning", en_to_vi()).await.unwrap();

    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_submit_withDifferentDomains_shouldNotShareCacheEntries() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(backend.clone(), RecordingLedger::new(), test_settings());

    orchestrator.submit_text("love", auto_to_vi(None)).await.unwrap();
    orchestrator.submit_text("love", auto_to_vi(Some(DomainTag::General))).await.unwrap();
    orchestrator.submit_text("love", auto_to_vi(Some(DomainTag::General))).await.unwrap();

    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_history_shouldListMostRecentFirst() {
    let orchestrator = orchestrator_with(MockBackend::working(), RecordingLedger::new(), test_settings());

    orchestrator.submit_text("first", en_to_vi()).await.unwrap();
    orchestrator.submit_text("second", en_to_vi()).await.unwrap();

    let records = orchestrator.history(1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].input_text, "second");

    orchestrator.clear_history().await.unwrap();
    assert!(orchestrator.history(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_fromConcurrentCallers_shouldShareOneOrchestrator() {
    let backend = MockBackend::working();
    let ledger = RecordingLedger::new();
    let orchestrator = orchestrator_with(backend.clone(), ledger.clone(), test_settings());

    let texts = ["good morning", "good night", "see you later"];
    let outcomes = join_all(texts.iter().map(|text| orchestrator.submit_text(text, en_to_vi()))).await;

    assert!(outcomes.into_iter().all(|outcome| outcome.unwrap().is_success()));
    assert_eq!(backend.call_count(), 3);
    orchestrator.flush_history().await;
    assert_eq!(ledger.len(), 3);
    assert_eq!(orchestrator.cache().len(), 3);
    assert!(orchestrator.controls_enabled());
}
