//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the QueueStore trait.
//! Every operation opens its own short-lived connection, so no lock or
//! transaction is ever held across a network fetch, and several processes
//! can share one database file.

use crate::state::UrlStatus;
use crate::storage::schema::{initialize_schema, recreate_schema};
use crate::storage::traits::{QueueStore, StoreError, StoreResult};
use crate::storage::{QueuedUrl, UrlRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Columns selected for a full record, in `RawRecord` order
const RECORD_COLUMNS: &str = "id, url, status, http_code";

/// SQLite queue backend
#[derive(Debug, Clone)]
pub struct SqliteQueue {
    path: PathBuf,
    connect_timeout: Duration,
}

impl SqliteQueue {
    /// Creates a new SqliteQueue instance
    ///
    /// Opens the database once to switch it to WAL mode and create the
    /// schema; later operations reconnect on demand.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `connect_timeout` - How long to wait on a lock held by another connection
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteQueue)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path, connect_timeout: Duration) -> StoreResult<Self> {
        let queue = Self {
            path: path.to_path_buf(),
            connect_timeout,
        };

        let conn = queue.connect()?;
        // WAL lets readers proceed while one worker holds the write lock
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        Ok(queue)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a connection scoped to a single logical operation
    fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        conn.busy_timeout(self.connect_timeout)?;
        // An erase may have dropped the table since the last connection
        initialize_schema(&conn)?;
        Ok(conn)
    }

    /// Applies a terminal update guarded by the allowed source states
    ///
    /// The statement only matches `PROCESSING` or the target state itself,
    /// which keeps repeated calls harmless without ever regressing a record.
    fn finish(&self, id: i64, target: UrlStatus, http_code: Option<u16>) -> StoreResult<()> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE urls SET status = ?1, http_code = ?2
             WHERE id = ?3 AND status IN (?4, ?5)",
            params![
                target.to_db_string(),
                http_code,
                id,
                UrlStatus::Processing.to_db_string(),
                target.to_db_string()
            ],
        )?;

        if changed > 0 {
            return Ok(());
        }

        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM urls WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match current {
            None => Err(StoreError::NotFound(id)),
            Some(status) => Err(StoreError::InvalidTransition {
                id,
                from: parse_status(&status)?,
                to: target,
            }),
        }
    }
}

/// Row shape shared by every full-record query
type RawRecord = (i64, String, String, Option<u16>);

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parse_status(value: &str) -> StoreResult<UrlStatus> {
    UrlStatus::from_db_string(value)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown status '{}'", value)))
}

fn into_record((id, url, status, http_code): RawRecord) -> StoreResult<UrlRecord> {
    Ok(UrlRecord {
        id,
        url,
        status: parse_status(&status)?,
        http_code,
    })
}

impl QueueStore for SqliteQueue {
    // ===== Claim Primitives =====

    fn peek_next(&self) -> StoreResult<Option<QueuedUrl>> {
        let conn = self.connect()?;
        let next = conn
            .query_row(
                "SELECT id, url FROM urls WHERE status = ?1 ORDER BY id LIMIT 1",
                params![UrlStatus::New.to_db_string()],
                |row| {
                    Ok(QueuedUrl {
                        id: row.get(0)?,
                        url: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(next)
    }

    fn claim(&self, id: i64) -> StoreResult<bool> {
        let conn = self.connect()?;
        // Compare-and-swap: the status guard decides the race
        let changed = conn.execute(
            "UPDATE urls SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![
                UrlStatus::Processing.to_db_string(),
                id,
                UrlStatus::New.to_db_string()
            ],
        )?;
        Ok(changed == 1)
    }

    // ===== Terminal Updates =====

    fn mark_done(&self, id: i64, http_code: u16) -> StoreResult<()> {
        self.finish(id, UrlStatus::Done, Some(http_code))
    }

    fn mark_error(&self, id: i64) -> StoreResult<()> {
        self.finish(id, UrlStatus::Error, None)
    }

    // ===== Administration =====

    fn reset(&self) -> StoreResult<()> {
        let conn = self.connect()?;
        recreate_schema(&conn)?;
        Ok(())
    }

    fn insert_urls(&self, urls: &[String]) -> StoreResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO urls (url, status) VALUES (?1, ?2)")?;
            for url in urls {
                stmt.execute(params![url, UrlStatus::New.to_db_string()])?;
            }
        }
        tx.commit()?;
        Ok(urls.len())
    }

    // ===== Inspection =====

    fn get_record(&self, id: i64) -> StoreResult<UrlRecord> {
        let conn = self.connect()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM urls WHERE id = ?1", RECORD_COLUMNS),
                params![id],
                read_raw,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        into_record(raw)
    }

    fn list_records(&self) -> StoreResult<Vec<UrlRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM urls ORDER BY id",
            RECORD_COLUMNS
        ))?;
        let raws = stmt
            .query_map([], read_raw)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(into_record).collect()
    }

    fn count_by_status(&self, status: UrlStatus) -> StoreResult<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM urls WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
