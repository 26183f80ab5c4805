//! Retrying HTTP GET wrapper for the remote law API.
//!
//! Policy:
//! - 429 and 5xx: exponential backoff (`base * 2^attempt`), raised to a
//!   numeric `Retry-After` when the server sends a longer one
//! - other 4xx: returned immediately, never retried
//! - network errors: flat delay, then retry
//! - after the last attempt the final error is returned

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::RemoteError;

/// User agent string identifying this resolver.
const USER_AGENT: &str = concat!("citelaw-resolver/", env!("CARGO_PKG_VERSION"));

/// Longest server-requested wait we honor.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Retry settings for one fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub network_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt `attempt` (0-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let config = ApiConfig::default();
        Self::from(&config)
    }
}

impl From<&ApiConfig> for RetryPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay,
            network_delay: config.network_retry_delay,
        }
    }
}

/// GET client with bearer authentication and retries.
///
/// NOTE: Do NOT derive `Debug` on this struct; `api_key` would be exposed.
pub struct RetryableFetcher {
    client: Client,
    api_key: Option<String>,
    policy: RetryPolicy,
}

impl RetryableFetcher {
    /// Create a fetcher with a client configured from `config`.
    pub fn new(config: &ApiConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::with_client(
            client,
            config.api_key.clone(),
            RetryPolicy::from(config),
        ))
    }

    #[must_use]
    pub fn with_client(client: Client, api_key: Option<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            api_key,
            policy,
        }
    }

    /// GET `url` with query `params` and decode the JSON body.
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, RemoteError> {
        self.get_json(url, params).await
    }

    /// GET `url` with query `params` and decode the body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let response = self.send_with_retry(url, params).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn send_with_retry(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Response, RemoteError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<String> = None;
        let mut next_delay = Duration::ZERO;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                tracing::debug!(attempt, delay_ms = next_delay.as_millis() as u64, url, "Retrying after delay");
                tokio::time::sleep(next_delay).await;
            }

            let mut request = self.client.get(url).header(ACCEPT, "application/json");
            if !params.is_empty() {
                request = request.query(params);
            }
            if let Some(key) = &self.api_key {
                request = request.header(AUTHORIZATION, format!("Bearer {key}"));
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_builder() => return Err(RemoteError::Http(e)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts,
                        url,
                        "Network error, will retry"
                    );
                    last_error = Some(e.to_string());
                    next_delay = self.policy.network_delay;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let backoff = self.policy.backoff(attempt);
                next_delay = retry_after(&response)
                    .map(|wait| wait.min(MAX_RETRY_AFTER).max(backoff))
                    .unwrap_or(backoff);
                tracing::warn!(
                    status = %status,
                    attempt = attempt + 1,
                    max_attempts,
                    url,
                    "Transient remote error, will retry"
                );
                last_error = Some(if status == StatusCode::TOO_MANY_REQUESTS {
                    format!("Rate limited: {status}")
                } else {
                    format!("Server error: {status}")
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RemoteError::Client {
                    status: status.as_u16(),
                    url: url.to_string(),
                    body,
                });
            }

            return Ok(response);
        }

        Err(RemoteError::RetriesExhausted {
            attempts: max_attempts,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

impl fmt::Debug for RetryableFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryableFetcher")
            .field("authenticated", &self.api_key.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Numeric `Retry-After` header in seconds.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
