//! Backoff for Weatherbit requests.
//!
//! Retried: timeouts, connection failures, 5xx, 429 and 408. Weatherbit
//! rate-limits free keys with 429 and may send `Retry-After`; when it does,
//! that wait is used instead of the backoff, still capped at `max_delay`.
//!
//! Not retried: other 4xx responses, including 401/403 from a bad API key.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each one after
    pub initial_delay: Duration,
    /// Upper bound for any single wait, server hints included
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// A single attempt, no retries
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Backoff before retry number `attempt + 1`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    fn wait(&self, attempt: u32, server_hint: Option<Duration>) -> Duration {
        match server_hint {
            Some(hint) => hint.min(self.max_delay),
            None => self.delay_for_attempt(attempt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

/// Classify a transport error.
pub fn is_retryable_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    match error.status() {
        Some(status) if !error.is_request() => is_retryable_status(status),
        _ => RetryDecision::NoRetry,
    }
}

/// Classify a response status.
pub fn is_retryable_status(status: StatusCode) -> RetryDecision {
    let transient = status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT;
    if transient {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Wait requested by a `Retry-After: <seconds>` header.
///
/// The HTTP-date form is not used by Weatherbit and is ignored.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Run `operation` until it yields a non-retryable outcome or retries run out.
///
/// A retryable status on the final attempt is handed back as a response so
/// the caller can map it like any other status.
///
/// # Errors
/// The transport error of the final attempt, or the first non-retryable one.
pub async fn with_retry<F, Fut>(config: &RetryConfig, operation: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let attempts = config.max_retries.saturating_add(1);
    let mut attempt = 0;
    let mut server_hint = None;

    loop {
        if attempt > 0 {
            let delay = config.wait(attempt - 1, server_hint.take());
            tracing::info!("Retrying weather request ({}/{}) in {:?}", attempt, config.max_retries, delay);
            tokio::time::sleep(delay).await;
        }
        let exhausted = attempt >= config.max_retries;

        match operation().await {
            Ok(response) => {
                let status = response.status();
                if exhausted || is_retryable_status(status) == RetryDecision::NoRetry {
                    return Ok(response);
                }
                server_hint = retry_after(response.headers());
                tracing::warn!(
                    "Weather API answered {} on attempt {}/{}{}",
                    status,
                    attempt + 1,
                    attempts,
                    server_hint
                        .map(|hint| format!(", asked to wait {:?}", hint))
                        .unwrap_or_default()
                );
            }
            Err(e) => {
                if exhausted || is_retryable_error(&e) == RetryDecision::NoRetry {
                    tracing::debug!("Giving up on weather request: {}", e);
                    return Err(e);
                }
                tracing::warn!("Weather request failed on attempt {}/{}: {}", attempt + 1, attempts, e);
            }
        }
        attempt += 1;
    }
}
