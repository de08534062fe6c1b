/*!
 * Repository layer for the history table.
 *
 * This module provides the SQL behind the history ledger: append, ordered
 * retrieval, full clear and plain-text export.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;

use crate::language_utils::LanguageTag;
use crate::translation::DomainTag;

use super::connection::DatabaseConnection;
use super::models::HistoryRecord;

/// Repository for history operations
#[derive(Clone)]
pub struct HistoryRepository {
    /// Database connection
    db: DatabaseConnection,
}

impl HistoryRepository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::open_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository backed by the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = DatabaseConnection::open(path)?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::in_memory()?;
        Ok(Self::new(db))
    }

    /// Append a record, returning its row id
    pub async fn append(&self, record: &HistoryRecord) -> Result<i64> {
        let record = record.clone();

        self.db
            .run(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO history (
                        src_lang, dst_lang, text_input, text_output, context, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        record.source_language.code(),
                        record.target_language.code(),
                        record.input_text,
                        record.output_text,
                        record.domain.map(|d| d.to_string()),
                        record.created_at.to_rfc3339(),
                    ],
                )?;
                let id = conn.last_insert_rowid();
                debug!("Appended history record {}", id);
                Ok(id)
            })
            .await
    }

    /// Most recent records first, at most `limit`
    pub async fn query(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.db
            .run(move |conn| Self::query_sync(conn, Some(limit)))
            .await
    }

    /// Every record, most recent first
    pub async fn query_all(&self) -> Result<Vec<HistoryRecord>> {
        self.db
            .run(|conn| Self::query_sync(conn, None))
            .await
    }

    fn query_sync(conn: &Connection, limit: Option<i64>) -> Result<Vec<HistoryRecord>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, src_lang, dst_lang, text_input, text_output, context, created_at
            FROM history
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        // SQLite treats a negative limit as no limit
        let records = stmt
            .query_map([limit.unwrap_or(-1)], Self::record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
        let source: String = row.get(1)?;
        let target: String = row.get(2)?;
        let context: Option<String> = row.get(5)?;
        let created_at: String = row.get(6)?;

        Ok(HistoryRecord {
            id: Some(row.get(0)?),
            source_language: parse_column(1, &source, |s| s.parse::<LanguageTag>())?,
            target_language: parse_column(2, &target, |s| s.parse::<LanguageTag>())?,
            input_text: row.get(3)?,
            output_text: row.get(4)?,
            domain: context
                .as_deref()
                .map(|c| parse_column(5, c, |s| s.parse::<DomainTag>()))
                .transpose()?,
            created_at: parse_column(6, &created_at, |s| {
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(anyhow::Error::from)
            })?,
        })
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<usize> {
        self.db
            .run(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
                Ok(usize::try_from(count).unwrap_or(0))
            })
            .await
    }

    /// Delete every record, returning how many were removed
    pub async fn clear(&self) -> Result<usize> {
        let removed = self
            .db
            .run(|conn| Ok(conn.execute("DELETE FROM history", [])?))
            .await?;

        info!("Cleared {} history records", removed);
        Ok(removed)
    }

    /// Write the whole history to a text file, newest first
    pub async fn export_to_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref().to_path_buf();
        let records = self.query_all().await?;

        let body = records
            .iter()
            .map(HistoryRecord::export_block)
            .collect::<Vec<_>>()
            .join("\n");

        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write history export: {:?}", path))?;

        info!("Exported {} history records to {:?}", records.len(), path);
        Ok(records.len())
    }
}

fn parse_column<T, F>(index: usize, value: &str, parse: F) -> rusqlite::Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    parse(value).map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, e.into()))
}
