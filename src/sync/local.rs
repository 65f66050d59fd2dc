//! Local snapshot store
//!
//! SQLite-backed fallback persistence for offline sessions: one row per
//! tracked date holding the day-log JSON. Saves replace the whole table in
//! a single transaction to match the snapshot-overwrite contract of the
//! remote store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OpenFlags};
use tracing::warn;

use crate::history::HistoryStore;
use crate::models::DayLog;

use super::{Credential, HistoryBackend, SyncResult};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Pooled SQLite store for local-only sessions
#[derive(Clone)]
pub struct LocalStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
    path: String,
}

impl LocalStore {
    /// Open (or create) the store and bring the schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let display = path.as_ref().display().to_string();
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA temp_store = MEMORY;",
                )?;
                Ok(())
            });

        let pool = Pool::builder().max_size(4).build(manager)?;

        let store = Self {
            pool: Arc::new(pool),
            path: display,
        };
        store.with_conn(|conn| run_migrations(conn))?;
        Ok(store)
    }

    fn get_conn(&self) -> SyncResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn with_conn<F, T>(&self, f: F) -> SyncResult<T>
    where
        F: FnOnce(&Connection) -> SyncResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Applied schema version of the open database
    pub fn schema_version(&self) -> SyncResult<i32> {
        self.with_conn(schema_version)
    }

    fn read_snapshot(&self) -> SyncResult<HistoryStore> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT date, log FROM day_logs ORDER BY date")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut history = HistoryStore::new();
            for row in rows {
                let (date_text, log_text) = row?;
                let Ok(date) = date_text.parse::<NaiveDate>() else {
                    warn!("skipping day log with unparseable date key {date_text:?}");
                    continue;
                };
                // A corrupt row degrades to the default log rather than
                // failing the whole load
                let log: DayLog = serde_json::from_str(&log_text).unwrap_or_else(|e| {
                    warn!("malformed day log for {date}: {e}; using defaults");
                    DayLog::default()
                });
                history.insert_day(date, log);
            }
            Ok(history)
        })
    }

    fn write_snapshot(&self, history: &HistoryStore) -> SyncResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM day_logs", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO day_logs (date, log) VALUES (?1, ?2)")?;
            for (date, log) in history.iter() {
                stmt.execute(params![date.to_string(), serde_json::to_string(log)?])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl HistoryBackend for LocalStore {
    async fn load(&self, _credential: &Credential) -> SyncResult<HistoryStore> {
        self.read_snapshot()
    }

    async fn save(&self, _credential: &Credential, history: &HistoryStore) -> SyncResult<()> {
        self.write_snapshot(history)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Bring the schema up to the current version
pub fn run_migrations(conn: &Connection) -> SyncResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Applied schema version, 0 for a fresh database
pub fn schema_version(conn: &Connection) -> SyncResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    debug_assert!(version <= SCHEMA_VERSION);
    Ok(version)
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> SyncResult<()> {
    conn.execute_batch(
        r#"
        -- One row per tracked date; the log column is the wire-format JSON
        CREATE TABLE day_logs (
            date TEXT PRIMARY KEY,
            log TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}
