//! Output module for reporting queue progress

pub mod stats;

pub use stats::{load_statistics, print_statistics, QueueStatistics};
