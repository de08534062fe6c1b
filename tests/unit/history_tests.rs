/*!
 * Tests for the history store
 */

use tokio_test::assert_ok;

use livetrans::history::HistoryRepository;
use livetrans::{DomainTag, HistoryLedger, HistoryRecord, LanguageTag};

fn record(input: &str, output: &str) -> HistoryRecord {
    HistoryRecord::new(LanguageTag::English, LanguageTag::Vietnamese, input, output, Some(DomainTag::Travel))
}

#[tokio::test]
async fn test_repository_withFileDatabase_shouldPersistAcrossReopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.db");

    {
        let repo = HistoryRepository::open(&path).unwrap();
        repo.append(&record("where is the station", "nhà ga ở đâu")).await.unwrap();
    }

    let reopened = HistoryRepository::open(&path).unwrap();
    let records = reopened.query(50).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].output_text, "nhà ga ở đâu");
    assert_eq!(records[0].domain, Some(DomainTag::Travel));
}

#[tokio::test]
async fn test_ledger_query_shouldNotMutate() {
    let repo = HistoryRepository::new_in_memory().unwrap();
    let ledger: &dyn HistoryLedger = &repo;

    ledger.append(record("one", "một")).await.unwrap();
    ledger.append(record("two", "hai")).await.unwrap();

    let first = ledger.query(10).await.unwrap();
    let second = ledger.query(10).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].input_text, "two");
}

#[tokio::test]
async fn test_ledger_clear_shouldEmptyStore() {
    let repo = HistoryRepository::new_in_memory().unwrap();
    let ledger: &dyn HistoryLedger = &repo;

    assert_ok!(ledger.append(record("one", "một")).await);
    assert_ok!(ledger.clear().await);

    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_queryAll_shouldReturnEveryRecord() {
    let repo = HistoryRepository::new_in_memory().unwrap();
    for i in 0..60 {
        repo.append(&record(&format!("text {}", i), "x")).await.unwrap();
    }

    assert_eq!(repo.query(50).await.unwrap().len(), 50);
    assert_eq!(repo.query_all().await.unwrap().len(), 60);
}
