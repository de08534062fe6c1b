/*!
 * SQLite handle for the history store.
 *
 * One connection per store, shared behind a mutex. Async callers go through
 * `run`, which moves the work onto Tokio's blocking pool.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::schema;

const DEFAULT_DB_FILENAME: &str = "history.db";

/// Directory under the user's data directory
const DEFAULT_DB_DIRNAME: &str = "livetrans";

/// How long a writer waits on a locked file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

/// Shared, migrated SQLite connection
#[derive(Clone)]
pub struct DatabaseConnection {
    location: DatabaseLocation,
    conn: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open (or create) the database file at `path`, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history directory: {:?}", parent))?;
        }

        info!("Opening history database at {:?}", path);
        let mut conn = Connection::open(&path)
            .with_context(|| format!("Failed to open history database: {:?}", path))?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("History journal mode: {}", mode);

        schema::initialize_schema(&mut conn)?;
        Ok(Self::wrap(DatabaseLocation::File(path), conn))
    }

    /// Open the database at `default_database_path`
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_database_path()?)
    }

    /// Private in-memory database, gone when the last clone drops
    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("Failed to create in-memory history database")?;
        schema::initialize_schema(&mut conn)?;
        Ok(Self::wrap(DatabaseLocation::Memory, conn))
    }

    fn wrap(location: DatabaseLocation, conn: Connection) -> Self {
        Self {
            location,
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// `<data dir>/livetrans/history.db`
    pub fn default_database_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .map(|base| base.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
            .ok_or_else(|| anyhow!("Could not determine a data directory for the history database"))
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    /// File path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            DatabaseLocation::File(path) => Some(path),
            DatabaseLocation::Memory => None,
        }
    }

    /// Run `f` with the connection on the current thread
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.conn.lock())
    }

    /// Run `f` with the connection on the blocking pool
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&conn.lock()))
            .await
            .context("History database task failed")?
    }
}
