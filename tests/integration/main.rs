//! Integration tests for urlq
//!
//! These tests use wiremock to stand in for the fetched sites and drive
//! the real reqwest transport against an on-disk SQLite queue.

mod common;
mod fetch_tests;
#[cfg(target_os = "linux")]
mod process_tests;
mod worker_tests;
