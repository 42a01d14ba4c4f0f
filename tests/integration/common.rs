use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use urlq::config::FetchConfig;
use urlq::fetcher::{FetchExecutor, ReqwestFetcher};
use urlq::storage::{QueueStore, SqliteQueue};

/// A queue database living in its own temporary directory
pub struct TestQueue {
    pub queue: SqliteQueue,
    pub path: PathBuf,
    _dir: TempDir,
}

impl TestQueue {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("urls.sqlite3");
        let queue = SqliteQueue::new(&path, Duration::from_secs(5)).expect("Failed to open queue");
        Self {
            queue,
            path,
            _dir: dir,
        }
    }

    pub fn with_urls(urls: &[String]) -> Self {
        let test_queue = Self::new();
        test_queue
            .queue
            .insert_urls(urls)
            .expect("Failed to insert URLs");
        test_queue
    }

    pub fn store(&self) -> Arc<dyn QueueStore> {
        Arc::new(self.queue.clone())
    }
}

/// Executor over the real HTTP client with a short timeout
pub fn http_executor(timeout_secs: u64) -> FetchExecutor {
    let config = FetchConfig {
        timeout_secs,
        connect_timeout_secs: timeout_secs,
        ..FetchConfig::default()
    };
    let fetcher = ReqwestFetcher::new(&config).expect("Failed to build fetcher");
    FetchExecutor::new(Arc::new(fetcher))
}

/// A local URL nothing is listening on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}
