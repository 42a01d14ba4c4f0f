//! Worker lifecycle - the poll/claim/fetch/update loop
//!
//! One `Worker` drives one state machine. Workers never share in-process
//! state; they only meet in the queue store.

use crate::fetcher::{FetchExecutor, FetchOutcome};
use crate::queue::claim_next;
use crate::state::UrlStatus;
use crate::storage::{QueueStore, QueuedUrl, StoreError};
use crate::worker::stop::StopSignal;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Default back-off after the store was unavailable
pub const DEFAULT_STORE_RETRY: Duration = Duration::from_secs(1);

/// What a worker does when it finds the queue empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnEmpty {
    /// Serve forever: sleep for the grace period, then poll again
    WaitAndRetry(Duration),
    /// Drain: exit the first time the queue is observed empty
    Stop,
}

/// Current phase of a worker's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Polling,
    Claiming,
    Fetching,
    Idle,
    Stopped,
}

/// Result of a single loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A URL was claimed, fetched, and left in the given status
    Processed(UrlStatus),
    /// No `NEW` record was available
    QueueEmpty,
    /// The store failed, possibly leaving a claimed record `PROCESSING`;
    /// the caller should back off
    StoreUnavailable,
    /// A stop was requested before the iteration began
    Stopped,
}

/// Counters accumulated over a worker's life
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// URLs claimed and brought to a terminal state
    pub processed: u64,
    pub done: u64,
    pub errors: u64,
    /// Candidates another worker claimed first
    pub lost_races: u64,
    /// Store operations that had to be retried
    pub store_retries: u64,
}

impl WorkerReport {
    /// Adds another worker's counters to this one
    pub fn absorb(&mut self, other: &WorkerReport) {
        self.processed += other.processed;
        self.done += other.done;
        self.errors += other.errors;
        self.lost_races += other.lost_races;
        self.store_retries += other.store_retries;
    }
}

/// A single queue worker
pub struct Worker {
    id: String,
    store: Arc<dyn QueueStore>,
    executor: FetchExecutor,
    policy: OnEmpty,
    store_retry: Duration,
    stop: StopSignal,
    state: WorkerState,
    report: WorkerReport,
}

impl Worker {
    /// Creates a worker that runs until told otherwise by `policy`
    ///
    /// # Arguments
    ///
    /// * `id` - Identity used in logs (`process-<pid>`, `thread-<n>`)
    /// * `store` - The shared queue
    /// * `executor` - Fetch executor for claimed URLs
    /// * `policy` - Serve-forever or drain behaviour on an empty queue
    pub fn new(
        id: impl Into<String>,
        store: Arc<dyn QueueStore>,
        executor: FetchExecutor,
        policy: OnEmpty,
    ) -> Self {
        Self {
            id: id.into(),
            store,
            executor,
            policy,
            store_retry: DEFAULT_STORE_RETRY,
            stop: StopSignal::never(),
            state: WorkerState::Polling,
            report: WorkerReport::default(),
        }
    }

    /// Checks this signal at the top of every iteration
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Sets the back-off used after store failures
    pub fn with_store_retry(mut self, store_retry: Duration) -> Self {
        self.store_retry = store_retry;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn report(&self) -> WorkerReport {
        self.report
    }

    /// Runs the loop until stopped or, under `OnEmpty::Stop`, drained
    pub async fn run(mut self) -> WorkerReport {
        let span = tracing::info_span!("worker", id = %self.id);
        async move {
            tracing::info!("Worker started");

            loop {
                match self.step().await {
                    StepOutcome::Processed(_) => {}
                    StepOutcome::QueueEmpty => match self.policy {
                        OnEmpty::Stop => {
                            tracing::info!("Queue drained");
                            break;
                        }
                        OnEmpty::WaitAndRetry(grace) => {
                            self.state = WorkerState::Idle;
                            tracing::info!(
                                "No urls to process. Sleeping for {}s",
                                grace.as_secs_f64()
                            );
                            if self.sleep_or_stop(grace).await {
                                break;
                            }
                        }
                    },
                    StepOutcome::StoreUnavailable => {
                        if self.sleep_or_stop(self.store_retry).await {
                            break;
                        }
                    }
                    StepOutcome::Stopped => break,
                }
            }

            self.state = WorkerState::Stopped;
            tracing::info!(
                "Worker stopped: {} processed ({} done, {} errors), {} lost races",
                self.report.processed,
                self.report.done,
                self.report.errors,
                self.report.lost_races
            );
            self.report
        }
        .instrument(span)
        .await
    }

    /// Executes one Polling pass: claim, fetch, record
    ///
    /// An in-flight fetch is never interrupted; the stop signal is only
    /// consulted before claiming.
    pub async fn step(&mut self) -> StepOutcome {
        if self.stop.is_stopped() {
            self.state = WorkerState::Stopped;
            return StepOutcome::Stopped;
        }

        self.state = WorkerState::Claiming;
        let outcome = match claim_next(self.store.as_ref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report_store_error("claim", &e);
                self.state = WorkerState::Polling;
                return StepOutcome::StoreUnavailable;
            }
        };
        self.report.lost_races += u64::from(outcome.lost_races());

        let claimed = match outcome.into_claimed() {
            Some(claimed) => claimed,
            None => {
                self.state = WorkerState::Polling;
                return StepOutcome::QueueEmpty;
            }
        };

        self.state = WorkerState::Fetching;
        let fetched = self.executor.execute(&claimed.url).await;
        match &fetched {
            FetchOutcome::Success { http_code, elapsed } => tracing::debug!(
                "Got {}: '{}' with {} code in {:.2}s",
                claimed.id,
                claimed.url,
                http_code,
                elapsed.as_secs_f64()
            ),
            FetchOutcome::Failure { kind, reason } => tracing::debug!(
                "Failed to fetch {}: '{}' because of {} ({})",
                claimed.id,
                claimed.url,
                reason,
                kind
            ),
        }

        if !self.record_terminal(&claimed, &fetched).await {
            self.state = WorkerState::Polling;
            return StepOutcome::StoreUnavailable;
        }

        let status = fetched.terminal_status();
        self.report.processed += 1;
        match status {
            UrlStatus::Done => self.report.done += 1,
            _ => self.report.errors += 1,
        }

        self.state = WorkerState::Polling;
        StepOutcome::Processed(status)
    }

    /// Writes the terminal state, retrying while the store is unavailable
    ///
    /// Returns false if the record was left `PROCESSING`.
    async fn record_terminal(&mut self, claimed: &QueuedUrl, outcome: &FetchOutcome) -> bool {
        loop {
            let result = match outcome {
                FetchOutcome::Success { http_code, .. } => {
                    self.store.mark_done(claimed.id, *http_code)
                }
                FetchOutcome::Failure { .. } => self.store.mark_error(claimed.id),
            };

            let err = match result {
                Ok(()) => return true,
                Err(e) => e,
            };

            self.report_store_error("terminal update", &err);
            if !err.is_retryable() {
                tracing::error!(
                    "Could not record {}: '{}'; it stays PROCESSING",
                    claimed.id,
                    claimed.url
                );
                return false;
            }
            if self.sleep_or_stop(self.store_retry).await {
                tracing::error!(
                    "Stopped before recording {}: '{}'; it stays PROCESSING",
                    claimed.id,
                    claimed.url
                );
                return false;
            }
        }
    }

    fn report_store_error(&mut self, operation: &str, err: &StoreError) {
        if err.is_retryable() {
            self.report.store_retries += 1;
            tracing::warn!(
                "Store unavailable during {}, retrying in {:?}: {}",
                operation,
                self.store_retry,
                err
            );
        } else {
            tracing::error!("Store error during {}: {}", operation, err);
        }
    }

    /// Sleeps for `duration`; returns true if a stop arrived first
    async fn sleep_or_stop(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.stop.stopped() => true,
        }
    }
}
