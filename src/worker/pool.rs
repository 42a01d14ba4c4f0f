use crate::fetcher::FetchExecutor;
use crate::storage::QueueStore;
use crate::worker::lifecycle::{OnEmpty, Worker, WorkerReport};
use crate::worker::stop::{stop_channel, StopHandle};
use crate::UrlqError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// In-process workers running as tokio tasks
///
/// Workers share the store handle but nothing else; the pool only keeps
/// their join handles and a common stop switch.
pub struct WorkerPool {
    stop: StopHandle,
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    /// Spawns `count` workers named `thread-0 .. thread-{count-1}`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        count: u32,
        store: Arc<dyn QueueStore>,
        executor: FetchExecutor,
        policy: OnEmpty,
        store_retry: Duration,
    ) -> Self {
        let (stop, signal) = stop_channel();

        let handles = (0..count)
            .map(|n| {
                let worker = Worker::new(
                    format!("thread-{}", n),
                    Arc::clone(&store),
                    executor.clone(),
                    policy,
                )
                .with_stop_signal(signal.clone())
                .with_store_retry(store_retry);
                tokio::spawn(worker.run())
            })
            .collect();

        tracing::info!("Started {} in-process workers", count);
        Self { stop, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// A handle that can stop the pool from elsewhere
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Asks every worker to stop after its current iteration
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Waits for every worker and returns their reports
    pub async fn join(self) -> Result<Vec<WorkerReport>, UrlqError> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let report = handle
                .await
                .map_err(|e| UrlqError::Launch(format!("worker task failed: {}", e)))?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Waits for every worker and sums their reports
    pub async fn join_total(self) -> Result<WorkerReport, UrlqError> {
        let mut total = WorkerReport::default();
        for report in self.join().await? {
            total.absorb(&report);
        }
        Ok(total)
    }
}
