//! HTTP transport backed by reqwest
//!
//! This module handles:
//! - Building the HTTP client from `FetchConfig`
//! - Issuing the GET request and returning the raw status code
//! - Classifying every reqwest error into a `FailureKind`

use crate::config::FetchConfig;
use crate::fetcher::{Fetch, FetchError, FailureKind};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;

/// Builds an HTTP client with the configured timeouts and redirect limit
///
/// # Example
///
/// ```no_run
/// use urlq::config::FetchConfig;
/// use urlq::fetcher::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a reqwest error onto the failure taxonomy
///
/// | Condition | Kind |
/// |-----------|------|
/// | Request or connect timed out | Timeout |
/// | Host name did not resolve | Dns |
/// | Connection refused/reset | Connect |
/// | Unusable URL | InvalidUrl |
/// | Redirect loop or limit, malformed response | Protocol |
/// | Body or decoding failure | Body |
pub fn classify_error(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        if error_chain(err).contains("dns error") {
            FailureKind::Dns
        } else {
            FailureKind::Connect
        }
    } else if err.is_builder() {
        FailureKind::InvalidUrl
    } else if err.is_redirect() || err.is_request() {
        FailureKind::Protocol
    } else if err.is_body() || err.is_decode() {
        FailureKind::Body
    } else {
        FailureKind::Other
    }
}

/// Flattens an error and its sources into one diagnostic line
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Fetch transport issuing real HTTP requests
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError> {
        // Any HTTP status is an answer; only transport faults are errors
        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) => Err(FetchError::new(classify_error(&e), error_chain(&e))),
        }
    }
}
