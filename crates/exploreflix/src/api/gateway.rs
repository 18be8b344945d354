//! Request gateway: rate limiting, timeout and retry around one GET.
//!
//! Every outbound provider call goes through [`RequestGateway::request`].
//! Failures never surface as errors; an exhausted retry budget yields `None`,
//! which callers read as "no data for this call".

use super::rate_limiter::RateLimiter;
use super::transport::{HttpTransport, TransportError};
use serde::de::DeserializeOwned;
use shared::config::GatewayConfig;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

const TOO_MANY_REQUESTS: u16 = 429;
const REQUEST_TIMEOUT: u16 = 408;

/// Longest response body excerpt kept in logs
const BODY_EXCERPT_LEN: usize = 200;

/// Retry and timeout settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPolicy {
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Backoff unit after a failed attempt
    pub retry_delay: Duration,
    /// Backoff unit after an HTTP 429
    pub rate_limited_delay: Duration,
}

impl From<&GatewayConfig> for GatewayPolicy {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            timeout: Duration::from_millis(config.timeout_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            rate_limited_delay: Duration::from_millis(config.rate_limited_delay_ms),
        }
    }
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

/// Why a single attempt failed
#[derive(Debug, Error)]
enum AttemptError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("unexpected HTTP status {status}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AttemptError {
    /// Client errors other than 408 and 429 will not change on retry
    fn is_final(&self) -> bool {
        match self {
            AttemptError::Status { status, .. } => {
                (400..500).contains(status) && *status != REQUEST_TIMEOUT
            }
            _ => false,
        }
    }
}

/// Backoff before attempt `attempt + 1`, saturating instead of overflowing
fn backoff(unit: Duration, attempt: u32) -> Duration {
    unit.saturating_mul(attempt)
}

/// Gateway for one provider
#[derive(Clone)]
pub struct RequestGateway {
    /// Provider name, used in logs
    provider: &'static str,
    transport: Arc<dyn HttpTransport>,
    /// Token bucket shared by every call to this provider
    rate_limiter: Arc<RateLimiter>,
    policy: GatewayPolicy,
}

impl RequestGateway {
    pub fn new(
        provider: &'static str,
        transport: Arc<dyn HttpTransport>,
        rate_limiter: Arc<RateLimiter>,
        policy: GatewayPolicy,
    ) -> Self {
        Self {
            provider,
            transport,
            rate_limiter,
            policy,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn policy(&self) -> &GatewayPolicy {
        &self.policy
    }

    /// Fetch and decode `url` with the configured policy
    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        self.request(url, self.policy.max_attempts, self.policy.timeout)
            .await
    }

    /// Fetch and decode `url`, making at most `attempts` attempts of at most
    /// `attempt_timeout` each.
    ///
    /// A 429 waits `rate_limited_delay * n` and any other failure waits
    /// `retry_delay * n` before attempt `n + 1`. Both kinds count toward the
    /// budget. Other 4xx responses end the request at once.
    pub async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        attempts: u32,
        attempt_timeout: Duration,
    ) -> Option<T> {
        let attempts = attempts.max(1);
        let log_url = redact(url);

        for attempt in 1..=attempts {
            // Apply rate limiting before each attempt
            self.rate_limiter.acquire().await;

            debug!(provider = self.provider, url = %log_url, attempt, "Making API request");

            match self.attempt(url, attempt_timeout).await {
                Ok(data) => {
                    debug!(provider = self.provider, url = %log_url, "Request successful");
                    return Some(data);
                }
                Err(AttemptError::RateLimited) => {
                    if attempt < attempts {
                        let delay = backoff(self.policy.rate_limited_delay, attempt);
                        warn!(
                            provider = self.provider,
                            url = %log_url,
                            delay_ms = delay.as_millis() as u64,
                            "Rate limited by server, waiting"
                        );
                        sleep(delay).await;
                    }
                }
                Err(e) if e.is_final() => {
                    if let AttemptError::Status { body, .. } = &e {
                        debug!(provider = self.provider, body = %body, "Provider error body");
                    }
                    warn!(
                        provider = self.provider,
                        url = %log_url,
                        attempt,
                        error = %e,
                        "Request rejected, not retrying"
                    );
                    return None;
                }
                Err(e) => {
                    if let AttemptError::Status { body, .. } = &e {
                        debug!(provider = self.provider, body = %body, "Provider error body");
                    }
                    warn!(
                        provider = self.provider,
                        url = %log_url,
                        attempt,
                        error = %e,
                        "Request attempt failed"
                    );
                    if attempt < attempts {
                        let delay = backoff(self.policy.retry_delay, attempt);
                        debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
                        sleep(delay).await;
                    }
                }
            }
        }

        warn!(
            provider = self.provider,
            url = %log_url,
            attempts,
            "Request failed after all attempts"
        );
        None
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &str,
        attempt_timeout: Duration,
    ) -> Result<T, AttemptError> {
        let response = timeout(attempt_timeout, self.transport.get(url))
            .await
            .map_err(|_| AttemptError::Timeout(attempt_timeout))??;

        if response.status == TOO_MANY_REQUESTS {
            return Err(AttemptError::RateLimited);
        }
        if !response.is_success() {
            let body = response.body.chars().take(BODY_EXCERPT_LEN).collect();
            return Err(AttemptError::Status {
                status: response.status,
                body,
            });
        }

        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Hide the value of an `apikey` query parameter
fn redact(url: &str) -> Cow<'_, str> {
    const KEY: &str = "apikey=";

    match url.find(KEY) {
        Some(start) => {
            let value_start = start + KEY.len();
            let value_end = url[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(url.len());
            Cow::Owned(format!("{}***{}", &url[..value_start], &url[value_end..]))
        }
        None => Cow::Borrowed(url),
    }
}
