//! Configuration module for urlq
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error: every setting has a default.
//!
//! # Example
//!
//! ```no_run
//! use urlq::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("urlq.toml")).unwrap();
//! println!("Queue database: {}", config.queue.database_path.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, ManageConfig, QueueConfig, WorkerConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::{validate, validate_worker_count, MAX_WORKERS};
