//! Storage traits and error types
//!
//! This module defines the trait interface for queue backends and
//! associated error types.

use crate::state::UrlStatus;
use crate::storage::{QueuedUrl, UrlRecord};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors that can occur during queue store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be opened or locked within the timeout
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("URL record not found: {0}")]
    NotFound(i64),

    #[error("Invalid state transition for record {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: UrlStatus,
        to: UrlStatus,
    },

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns true if the caller should back off and try again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(
                    failure.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
                ) =>
            {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Sqlite(err),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for queue backend implementations
///
/// Implementations are shared by every worker in a process, so all methods
/// take `&self`. The only mutual exclusion in the system is `claim`: it must
/// be a single atomic conditional update so that racing workers can never
/// both win the same record.
pub trait QueueStore: Send + Sync {
    // ===== Claim Primitives =====

    /// Returns some record currently in `NEW`, or `None` if there is none
    ///
    /// No ordering is promised to callers. Side-effect free.
    fn peek_next(&self) -> StoreResult<Option<QueuedUrl>>;

    /// Atomically moves a record from `NEW` to `PROCESSING`
    ///
    /// Returns false if the record was no longer `NEW` (another worker won).
    fn claim(&self, id: i64) -> StoreResult<bool>;

    // ===== Terminal Updates =====

    /// Sets `status = DONE` and records the HTTP code
    ///
    /// Repeating the call on a `DONE` record is harmless. Any other source
    /// state than `PROCESSING` yields `StoreError::InvalidTransition`.
    fn mark_done(&self, id: i64, http_code: u16) -> StoreResult<()>;

    /// Sets `status = ERROR`; `http_code` stays unset
    ///
    /// Same idempotence and transition rules as `mark_done`.
    fn mark_error(&self, id: i64) -> StoreResult<()>;

    // ===== Administration =====

    /// Drops and recreates the queue, discarding every record
    fn reset(&self) -> StoreResult<()>;

    /// Inserts each URL as a `NEW` record, returning how many were inserted
    fn insert_urls(&self, urls: &[String]) -> StoreResult<usize>;

    // ===== Inspection =====

    /// Gets a record by ID
    fn get_record(&self, id: i64) -> StoreResult<UrlRecord>;

    /// Gets every record in insertion order
    fn list_records(&self) -> StoreResult<Vec<UrlRecord>>;

    /// Counts records in a specific status
    fn count_by_status(&self, status: UrlStatus) -> StoreResult<u64>;
}
