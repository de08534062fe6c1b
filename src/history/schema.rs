/*!
 * History database schema.
 *
 * The schema version lives in SQLite's `user_version` pragma. Each entry of
 * `MIGRATIONS` moves the database one version forward; opening a database
 * applies whatever it is missing inside a single transaction.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Ordered migrations; version N is reached by applying the first N entries
const MIGRATIONS: &[&str] = &[
    // v1: append-only history, ids give the most-recent-first order
    r#"
    CREATE TABLE history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        src_lang TEXT NOT NULL,
        dst_lang TEXT NOT NULL,
        text_input TEXT NOT NULL,
        text_output TEXT NOT NULL,
        context TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_history_created_at ON history(created_at);
    "#,
];

/// Version a fully migrated database reports
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to `SCHEMA_VERSION`
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let current = schema_version(conn)?;

    if current > SCHEMA_VERSION {
        return Err(anyhow!(
            "History database is at schema v{}, newer than supported v{}",
            current,
            SCHEMA_VERSION
        ));
    }
    if current == SCHEMA_VERSION {
        debug!("History schema is up to date (v{})", current);
        return Ok(());
    }

    let tx = conn.transaction().context("Failed to start schema migration")?;
    for (index, migration) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        tx.execute_batch(migration)
            .with_context(|| format!("Failed to apply history migration v{}", index + 1))?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit().context("Failed to commit schema migration")?;

    info!("History schema migrated from v{} to v{}", current, SCHEMA_VERSION);
    Ok(())
}

/// Current `user_version` of the database
pub fn schema_version(conn: &Connection) -> Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("Failed to read history schema version")
}
