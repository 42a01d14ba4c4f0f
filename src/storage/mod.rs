//! Storage module for the durable URL queue
//!
//! This module handles all database operations for the queue, including:
//! - SQLite database initialization and schema management
//! - The atomic `NEW -> PROCESSING` claim primitive
//! - Terminal updates (`DONE` with an HTTP code, or `ERROR`)
//! - Whole-queue reset and batch inserts for the admin tooling

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteQueue;
pub use traits::{QueueStore, StoreError, StoreResult};

use crate::state::UrlStatus;
use std::path::Path;
use std::time::Duration;

/// Opens (creating if needed) the queue database at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `connect_timeout` - Bounded wait for a lock held by another process
pub fn open_queue(path: &Path, connect_timeout: Duration) -> StoreResult<SqliteQueue> {
    SqliteQueue::new(path, connect_timeout)
}

/// Represents a URL row in the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub status: UrlStatus,
    pub http_code: Option<u16>,
}

impl UrlRecord {
    /// Checks that `http_code` is present exactly when the record is `DONE`
    pub fn is_consistent(&self) -> bool {
        self.http_code.is_some() == (self.status == UrlStatus::Done)
    }
}

/// A transient, non-owning copy of a queued URL held by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub id: i64,
    pub url: String,
}
