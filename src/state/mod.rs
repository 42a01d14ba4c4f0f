//! State module for tracking queue progress
//!
//! `UrlStatus` is the lifecycle of a single queued URL. Only the claim
//! protocol moves a record out of `New`, and only a worker's terminal
//! update moves it out of `Processing`.

mod url_status;

pub use url_status::UrlStatus;
