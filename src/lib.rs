//! urlq: a distributed-queue URL fetcher
//!
//! A shared SQLite queue of URLs and a pool of independent workers, each
//! of which atomically claims one URL, fetches it over HTTP, and records
//! the outcome. Workers may be OS processes or tasks in one process; the
//! store's conditional update is the only coordination between them.

pub mod config;
pub mod fetcher;
pub mod output;
pub mod queue;
pub mod state;
pub mod storage;
pub mod worker;

use thiserror::Error;

/// Main error type for urlq operations
#[derive(Debug, Error)]
pub enum UrlqError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker launch error: {0}")]
    Launch(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for urlq operations
pub type Result<T> = std::result::Result<T, UrlqError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::{normalize_url, FetchExecutor, FetchOutcome, ReqwestFetcher};
pub use state::UrlStatus;
pub use storage::{QueueStore, SqliteQueue, UrlRecord};
pub use worker::{OnEmpty, Worker, WorkerPool};
