//! Fetch executor: one HTTP request per claimed URL
//!
//! This module contains:
//! - Scheme normalization applied before dispatch
//! - The `Fetch` transport seam and its reqwest implementation
//! - Classification of transport faults into a single `Failure` outcome

mod client;
mod executor;
mod normalize;

pub use client::{build_http_client, classify_error, ReqwestFetcher};
pub use executor::{FetchExecutor, FetchOutcome};
pub use normalize::{has_known_scheme, normalize_url};

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Broad class of a transport failure, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidUrl,
    Dns,
    Connect,
    Timeout,
    Protocol,
    Body,
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Dns => "dns",
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Body => "body",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport-level fault reported by a `Fetch` implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Raw HTTP transport used by the executor
///
/// Returns the response status code for any answer, including 4xx and 5xx.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError>;
}
