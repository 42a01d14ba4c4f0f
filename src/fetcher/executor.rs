use crate::fetcher::normalize::normalize_url;
use crate::fetcher::{FailureKind, Fetch};
use crate::state::UrlStatus;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The endpoint answered with any HTTP status
    Success { http_code: u16, elapsed: Duration },

    /// A transport-level fault; `kind` and `reason` are diagnostics only
    Failure { kind: FailureKind, reason: String },
}

impl FetchOutcome {
    /// The terminal status this outcome is recorded as
    pub fn terminal_status(&self) -> UrlStatus {
        match self {
            Self::Success { .. } => UrlStatus::Done,
            Self::Failure { .. } => UrlStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Runs a single fetch per claimed URL
///
/// No retries happen here: a failed fetch is terminal for that URL.
#[derive(Clone)]
pub struct FetchExecutor {
    transport: Arc<dyn Fetch>,
}

impl FetchExecutor {
    pub fn new(transport: Arc<dyn Fetch>) -> Self {
        Self { transport }
    }

    /// Normalizes the URL, fetches it, and classifies the result
    pub async fn execute(&self, url: &str) -> FetchOutcome {
        let target = normalize_url(url);

        if let Err(e) = Url::parse(&target) {
            return FetchOutcome::Failure {
                kind: FailureKind::InvalidUrl,
                reason: format!("{}: {}", target, e),
            };
        }

        let started = Instant::now();
        match self.transport.fetch(&target).await {
            Ok(http_code) => FetchOutcome::Success {
                http_code,
                elapsed: started.elapsed(),
            },
            Err(e) => FetchOutcome::Failure {
                kind: e.kind,
                reason: e.message,
            },
        }
    }
}
