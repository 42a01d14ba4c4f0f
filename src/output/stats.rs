//! Statistics generation from the queue database
//!
//! This module provides functionality for extracting and displaying
//! queue progress from the storage layer.

use crate::state::UrlStatus;
use crate::storage::{QueueStore, StoreResult};
use std::collections::HashMap;

/// Queue statistics summary
#[derive(Debug, Clone, Default)]
pub struct QueueStatistics {
    /// Total number of URLs in the queue
    pub total_urls: u64,

    /// Count of URLs by status
    pub urls_by_status: HashMap<UrlStatus, u64>,
}

impl QueueStatistics {
    pub fn count(&self, status: UrlStatus) -> u64 {
        self.urls_by_status.get(&status).copied().unwrap_or(0)
    }

    /// URLs that reached `DONE` or `ERROR`
    pub fn finished(&self) -> u64 {
        self.count(UrlStatus::Done) + self.count(UrlStatus::Error)
    }

    /// Share of the queue in a terminal state, as a percentage
    pub fn completion_percent(&self) -> f64 {
        if self.total_urls == 0 {
            return 0.0;
        }
        (self.finished() as f64 / self.total_urls as f64) * 100.0
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The queue backend to query
///
/// # Returns
///
/// * `Ok(QueueStatistics)` - Successfully loaded statistics
/// * `Err(StoreError)` - Failed to query the store
pub fn load_statistics<S: QueueStore + ?Sized>(store: &S) -> StoreResult<QueueStatistics> {
    let mut stats = QueueStatistics::default();

    for status in UrlStatus::all_statuses() {
        let count = store.count_by_status(status)?;
        stats.total_urls += count;
        if count > 0 {
            stats.urls_by_status.insert(status, count);
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &QueueStatistics) {
    println!("=== Queue Statistics ===\n");

    println!("Total URLs: {}", stats.total_urls);
    println!();

    println!("URLs by Status:");
    for status in UrlStatus::all_statuses() {
        let count = stats.count(status);
        let percentage = if stats.total_urls > 0 {
            (count as f64 / stats.total_urls as f64) * 100.0
        } else {
            0.0
        };
        println!("  {:<10} {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!(
        "Completed: {:.1}% ({} / {} URLs finished)",
        stats.completion_percent(),
        stats.finished(),
        stats.total_urls
    );
}
