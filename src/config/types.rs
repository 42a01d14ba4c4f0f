use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for urlq
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub manage: ManageConfig,
}

/// Queue store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,

    /// Bounded wait for a database lock held elsewhere (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl QueueConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./urls.sqlite3"),
            connect_timeout_secs: 20,
        }
    }
}

/// Worker lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of workers started when the CLI does not say otherwise
    pub count: u32,

    /// Idle sleep between polls of an empty queue (seconds)
    #[serde(rename = "grace-period-secs")]
    pub grace_period_secs: u64,

    /// Back-off after the store was unavailable (seconds)
    #[serde(rename = "store-retry-secs")]
    pub store_retry_secs: u64,

    /// Enable debug logging in workers
    pub debug: bool,
}

impl WorkerConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub fn store_retry(&self) -> Duration {
        Duration::from_secs(self.store_retry_secs)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 4,
            grace_period_secs: 30,
            store_retry_secs: 1,
            debug: false,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout; expiry is recorded as a failed fetch (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Maximum redirects followed before giving up
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("urlq/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// Process management configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManageConfig {
    /// File listing the PIDs of spawned worker processes
    #[serde(rename = "pid-file")]
    pub pid_file: PathBuf,

    /// Log file that spawned worker processes append to
    #[serde(rename = "log-file")]
    pub log_file: PathBuf,
}

impl Default for ManageConfig {
    fn default() -> Self {
        Self {
            pid_file: PathBuf::from("./.pids"),
            log_file: PathBuf::from("./workers.log"),
        }
    }
}
