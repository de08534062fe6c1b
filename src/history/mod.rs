/*!
 * History ledger: append-only record of completed translations.
 *
 * The orchestrator only appends and reads for display. Append failures are
 * logged by the caller and never undo a delivered translation.
 */

use async_trait::async_trait;

use crate::errors::PersistenceError;

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::HistoryRecord;
pub use repository::HistoryRepository;

/// Durable store the orchestrator records translations into
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    /// Append one record
    async fn append(&self, record: HistoryRecord) -> Result<(), PersistenceError>;

    /// Most recent records first, at most `limit`; never mutates
    async fn query(&self, limit: usize) -> Result<Vec<HistoryRecord>, PersistenceError>;

    /// Remove every record
    async fn clear(&self) -> Result<(), PersistenceError>;
}

#[async_trait]
impl HistoryLedger for HistoryRepository {
    async fn append(&self, record: HistoryRecord) -> Result<(), PersistenceError> {
        HistoryRepository::append(self, &record).await?;
        Ok(())
    }

    async fn query(&self, limit: usize) -> Result<Vec<HistoryRecord>, PersistenceError> {
        Ok(HistoryRepository::query(self, limit).await?)
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        HistoryRepository::clear(self).await?;
        Ok(())
    }
}
