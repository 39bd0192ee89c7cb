//! HTTP requests with exponential backoff.

use crate::error::Result;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::time::Duration;
use tokio_retry2::strategy::ExponentialBackoff;
use tokio_retry2::{Retry, RetryError};
use tracing::warn;
use url::Url;

/// How many times a request is retried and how long to wait before the first retry.
///
/// Every further retry waits twice as long as the previous one. There is no
/// jitter and no cap on the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, initial_delay: Duration) -> Self {
        Self {
            retries,
            initial_delay,
        }
    }

    /// A policy that sends the request exactly once.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// The waits between consecutive attempts, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        // Base 2 yields 2d, 4d, 8d; halving gives d, 2d, 4d.
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(2)
            .factor(initial_ms)
            .map(|delay| delay / 2)
            .take(self.retries as usize)
    }
}

/// The request half of a fetch: method, headers and an optional body.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl FetchOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::POST,
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }
}

/// Why a single attempt did not succeed.
#[derive(Debug)]
enum AttemptFailure {
    Status(reqwest::Response),
    Transport(reqwest::Error),
}

/// Sends a request, retrying on transport errors and non-success statuses.
///
/// Once the retries are used up, a transport error is returned as
/// `StoryError::RequestFailed`, while a non-success response is handed back
/// as-is so the caller can inspect its status and body.
pub async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &Url,
    options: &FetchOptions,
    policy: RetryPolicy,
) -> Result<reqwest::Response> {
    let attempt = || async {
        let mut request = client
            .request(options.method.clone(), url.clone())
            .headers(options.headers.clone());
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let failure = match request.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => AttemptFailure::Status(response),
            Err(err) => AttemptFailure::Transport(err),
        };
        Err(RetryError::Transient {
            err: failure,
            retry_after: None,
        })
    };

    let notify = |failure: &AttemptFailure, delay: Duration| match failure {
        AttemptFailure::Status(response) => warn!(
            status = %response.status(),
            delay_ms = delay.as_millis() as u64,
            "Fetch failed. Retrying"
        ),
        AttemptFailure::Transport(err) => warn!(
            error = %err,
            delay_ms = delay.as_millis() as u64,
            "Fetch failed with error. Retrying"
        ),
    };

    match Retry::spawn_notify(policy.delays(), attempt, notify).await {
        Ok(response) | Err(AttemptFailure::Status(response)) => Ok(response),
        Err(AttemptFailure::Transport(err)) => Err(err.into()),
    }
}
