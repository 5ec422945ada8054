//! Snapshot store backed by SQLite
//!
//! Snapshots live in a single append-only table, `currency_data`. Ids come
//! from `AUTOINCREMENT`, so they are never reused and grow in commit order.
//! All rusqlite calls are blocking and run on `spawn_blocking` behind a
//! shared connection.

use crate::core::error::{RateError, Result};
use crate::core::snapshot::{NewSnapshot, RateSnapshot, Rates};
use crate::core::store::SnapshotStore;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT id, eur, usd, jpy, gbp, dataDateTime FROM currency_data";

const INSERT_SNAPSHOT: &str =
    "INSERT INTO currency_data (eur, usd, jpy, gbp, dataDateTime) VALUES (?1, ?2, ?3, ?4, ?5)";

pub struct SqliteSnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotStore {
    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `RateError::Persistence` if the file can't be opened or the
    /// schema can't be created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RateError::persistence(
                    format!("failed to create database directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| RateError::persistence("failed to open database", e))?;
        debug!("Opened snapshot database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RateError::persistence("failed to create in-memory database", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            f(&mut conn)
        })
        .await
        .map_err(|e| RateError::persistence(format!("blocking task failed during {operation}"), e))?
    }
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS currency_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            eur REAL NOT NULL,
            usd REAL NOT NULL,
            jpy REAL NOT NULL,
            gbp REAL NOT NULL,
            dataDateTime TEXT NOT NULL
        )
        "#,
        [],
    )
    .map_err(|e| RateError::persistence("failed to create currency_data table", e))?;
    Ok(())
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<RateSnapshot> {
    Ok(RateSnapshot {
        id: row.get(0)?,
        rates: Rates {
            eur: row.get(1)?,
            usd: row.get(2)?,
            jpy: row.get(3)?,
            gbp: row.get(4)?,
        },
        timestamp: row.get::<_, NaiveDateTime>(5)?,
    })
}

fn insert(conn: &Connection, record: NewSnapshot) -> rusqlite::Result<RateSnapshot> {
    let mut stmt = conn.prepare_cached(INSERT_SNAPSHOT)?;
    let [eur, usd, jpy, gbp] = record.rates.as_array();
    stmt.execute(params![eur, usd, jpy, gbp, record.timestamp])?;
    Ok(RateSnapshot {
        id: conn.last_insert_rowid(),
        rates: record.rates,
        timestamp: record.timestamp,
    })
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn append(&self, rates: Rates) -> Result<RateSnapshot> {
        let record = NewSnapshot::captured_now(rates);
        let snapshot = self
            .run("append", move |conn| {
                insert(conn, record).map_err(|e| RateError::persistence("failed to insert snapshot", e))
            })
            .await?;
        debug!(id = snapshot.id, "Inserted snapshot");
        Ok(snapshot)
    }

    async fn append_many(&self, records: Vec<NewSnapshot>) -> Result<Vec<RateSnapshot>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self
            .run("append_many", move |conn| {
                let tx = conn
                    .transaction()
                    .map_err(|e| RateError::persistence("failed to begin transaction", e))?;

                let mut stored = Vec::with_capacity(records.len());
                for (index, record) in records.into_iter().enumerate() {
                    // Dropping `tx` on error rolls back every row of the batch.
                    let snapshot = insert(&tx, record).map_err(|e| {
                        RateError::persistence(format!("failed to insert snapshot #{}", index + 1), e)
                    })?;
                    stored.push(snapshot);
                }

                tx.commit()
                    .map_err(|e| RateError::persistence("failed to commit snapshots", e))?;
                Ok(stored)
            })
            .await?;
        debug!(count = stored.len(), "Inserted snapshot batch");
        Ok(stored)
    }

    async fn latest(&self) -> Result<RateSnapshot> {
        self.run("latest", |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT 1"),
                [],
                snapshot_from_row,
            )
            .optional()
            .map_err(|e| RateError::persistence("failed to query latest snapshot", e))?
            .ok_or(RateError::NotFound("rate snapshot"))
        })
        .await
    }

    async fn all(&self) -> Result<Vec<RateSnapshot>> {
        self.run("all", |conn| {
            let mut stmt = conn
                .prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))
                .map_err(|e| RateError::persistence("failed to prepare snapshot query", e))?;

            let rows = stmt
                .query_map([], snapshot_from_row)
                .map_err(|e| RateError::persistence("failed to query snapshots", e))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| RateError::persistence("failed to read snapshot row", e))
        })
        .await
    }
}
