// SPDX-FileCopyrightText: 2025 Marcelo Prates
// SPDX-License-Identifier: MIT

//! Rate-limit aware HTTP fetching with classified retry behavior.
//!
//! Every outbound call in the pipeline goes through [`HttpFetcher`]. Failures
//! fall into three classes with distinct retry semantics: fatal caller errors
//! (404/401) fail immediately, an exhausted rate limit fails fast with a
//! computed wait estimate, and anything else is treated as transient and
//! retried with exponential backoff. Blanket retry would burn quota against
//! an exhausted limit; no retry at all would make builds flaky under normal
//! network blips.

use std::time::Duration;

use chrono::Utc;
use masterror::AppError;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (default: 3).
    pub max_attempts:     u32,
    /// Initial delay between retries in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0).
    pub backoff_factor:   f64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts:     3,
            initial_delay_ms: 1000,
            backoff_factor:   2.0
        }
    }
}

/// Classified failure produced by a fetch attempt.
///
/// The class determines retry behavior in [`retry_with_backoff`]: only
/// [`FetchFailure::Transient`] failures are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Caller errors (HTTP 404/401). Retrying cannot help.
    Fatal {
        /// HTTP status that triggered the failure.
        status:  u16,
        /// Human readable description.
        message: String
    },
    /// The API quota is exhausted (HTTP 403 with zero remaining quota).
    /// Retrying against an exhausted quota is pointless; the message carries
    /// a wait estimate computed from the reset timestamp header.
    RateLimited {
        /// Human readable description including the wait estimate.
        message: String
    },
    /// Any other non-2xx status or transport error. Worth retrying.
    Transient {
        /// Human readable description.
        message: String
    }
}

impl FetchFailure {
    /// Constructs a transient failure from the provided displayable value.
    pub fn transient<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Transient {
            message: message.into()
        }
    }

    /// Returns `true` when the failure should be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal {
                status,
                message
            } => write!(f, "fatal HTTP {status}: {message}"),
            Self::RateLimited {
                message
            } => write!(f, "{message}"),
            Self::Transient {
                message
            } => write!(f, "{message}")
        }
    }
}

impl From<FetchFailure> for AppError {
    fn from(failure: FetchFailure) -> Self {
        match failure {
            FetchFailure::Fatal {
                status: 401,
                message
            } => AppError::unauthorized(message),
            FetchFailure::Fatal {
                message, ..
            } => AppError::validation(message),
            FetchFailure::RateLimited {
                message
            } => AppError::service(message),
            FetchFailure::Transient {
                message
            } => AppError::service(message)
        }
    }
}

impl From<FetchFailure> for crate::error::Error {
    fn from(failure: FetchFailure) -> Self {
        crate::error::Error::service(failure.to_string())
    }
}

/// Formats the rate-limit wait estimate from the reset timestamp header.
///
/// The estimate is rounded up to whole minutes, matching the granularity a
/// build operator cares about.
pub fn rate_limit_message(reset_epoch: i64, now_epoch: i64) -> String {
    let remaining_secs = (reset_epoch - now_epoch).max(0) as u64;
    let minutes = remaining_secs.div_ceil(60);
    format!("API rate limit exceeded. Limit will reset in {minutes} minutes")
}

/// Classifies an HTTP response into a failure class, or `None` for success.
///
/// Pure function over the status code and the `x-ratelimit-remaining` /
/// `x-ratelimit-reset` header values so the taxonomy can be tested without a
/// network.
pub fn classify_response(
    status: u16,
    rate_limit_remaining: Option<&str>,
    rate_limit_reset: Option<&str>,
    now_epoch: i64
) -> Option<FetchFailure> {
    if (200..300).contains(&status) {
        return None;
    }

    if status == 403 && rate_limit_remaining == Some("0") {
        if let Some(reset) = rate_limit_reset.and_then(|value| value.parse::<i64>().ok()) {
            return Some(FetchFailure::RateLimited {
                message: rate_limit_message(reset, now_epoch)
            });
        }
    }

    if status == 404 || status == 401 {
        return Some(FetchFailure::Fatal {
            status,
            message: format!("HTTP {status}")
        });
    }

    Some(FetchFailure::Transient {
        message: format!("HTTP {status}")
    })
}

/// Executes an async operation with exponential backoff retry logic.
///
/// Only [`FetchFailure::Transient`] failures are retried; fatal and
/// rate-limited failures propagate immediately without consuming attempts.
///
/// # Errors
///
/// Returns the last observed failure once attempts are exhausted, or the
/// first non-transient failure.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F
) -> Result<T, FetchFailure>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchFailure>>
{
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(failure) => {
                if !failure.is_transient() {
                    warn!("{} failed without retry: {}", operation_name, failure);
                    return Err(failure);
                }

                if attempt >= config.max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name, config.max_attempts, failure
                    );
                    return Err(failure);
                }

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name, attempt, config.max_attempts, failure, delay_ms
                );

                sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
                attempt += 1;
            }
        }
    }
}

/// Per-call timeout bounding worst-case build time.
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("folio-pipeline/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper applying the retry and classification policy to every
/// request.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    retry:  RetryConfig
}

impl HttpFetcher {
    /// Builds a fetcher with the default retry policy and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying client cannot be constructed.
    pub fn new() -> Result<Self, AppError> {
        Self::with_retry(RetryConfig::default())
    }

    /// Builds a fetcher with a custom retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying client cannot be constructed.
    pub fn with_retry(retry: RetryConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            retry
        })
    }

    /// Performs a GET request with retry, returning the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure`] classified per the module taxonomy.
    pub async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)]
    ) -> Result<reqwest::Response, FetchFailure> {
        let client = self.client.clone();
        let url_owned = url.to_string();
        let headers_owned: Vec<(&'static str, String)> = headers.to_vec();

        retry_with_backoff(&self.retry, url, move || {
            let client = client.clone();
            let url = url_owned.clone();
            let headers = headers_owned.clone();
            async move {
                let mut request = client.get(&url);
                for (name, value) in &headers {
                    request = request.header(*name, value);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| FetchFailure::transient(format!("request to {url} failed: {e}")))?;

                let status = response.status().as_u16();
                let remaining = header_value(&response, "x-ratelimit-remaining");
                let reset = header_value(&response, "x-ratelimit-reset");

                match classify_response(
                    status,
                    remaining.as_deref(),
                    reset.as_deref(),
                    Utc::now().timestamp()
                ) {
                    Some(failure) => Err(failure),
                    None => Ok(response)
                }
            }
        })
        .await
    }

    /// Performs a GET request and decodes the response body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure`] when the request fails or the body cannot be
    /// read.
    pub async fn get_text(
        &self,
        url: &str,
        headers: &[(&'static str, String)]
    ) -> Result<String, FetchFailure> {
        let response = self.get(url, headers).await?;
        response
            .text()
            .await
            .map_err(|e| FetchFailure::transient(format!("failed to read body from {url}: {e}")))
    }

    /// Performs a GET request and decodes the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure`] when the request fails or the body cannot be
    /// decoded into `T`.
    pub async fn get_json<T>(
        &self,
        url: &str,
        headers: &[(&'static str, String)]
    ) -> Result<T, FetchFailure>
    where
        T: DeserializeOwned
    {
        let response = self.get(url, headers).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FetchFailure::transient(format!("unexpected payload from {url}: {e}")))
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}
