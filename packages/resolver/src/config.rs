//! Configuration for the remote API client and the traversal.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ResolverError, Result};

/// Default base URL of the remote law API.
pub const DEFAULT_BASE_URL: &str = "https://api.openlaws.us/api/v1";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Attempts per remote request, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff on 429/5xx (milliseconds).
pub const DEFAULT_RETRY_BASE_MS: u64 = 1000;

/// Flat delay before retrying after a network error (milliseconds).
pub const DEFAULT_NETWORK_RETRY_MS: u64 = 1000;

/// Hard cap on remote calls per traversal.
pub const DEFAULT_CALL_BUDGET: u32 = 50;

/// Levels explored below a compilation root.
pub const DEFAULT_MAX_DEPTH: u32 = 6;

/// Compilations searched when the citation carried a code hint.
pub const DEFAULT_HINTED_CANDIDATES: usize = 2;

/// Compilations searched without a code hint.
pub const DEFAULT_UNHINTED_CANDIDATES: usize = 5;

/// Remote calls between pacing pauses.
pub const DEFAULT_PACE_EVERY: u32 = 5;

/// Length of a pacing pause (milliseconds).
pub const DEFAULT_PACE_PAUSE_MS: u64 = 1000;

/// Connection settings for the remote law API.
///
/// NOTE: `Debug` is implemented by hand so the API key never ends up in logs.
#[derive(Clone)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub network_retry_delay: Duration,
}

impl ApiConfig {
    /// Read configuration from `OPENLAWS_*` environment variables.
    ///
    /// A missing `OPENLAWS_API_KEY` is not an error: the resolver then runs in
    /// "not configured" mode and only serves cached statutes.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENLAWS_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url =
            std::env::var("OPENLAWS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let timeout_secs = env_parse("OPENLAWS_TIMEOUT_SECS").unwrap_or(HTTP_TIMEOUT_SECS);
        let max_attempts = env_parse("OPENLAWS_MAX_RETRIES").unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let retry_base_ms = env_parse("OPENLAWS_RETRY_BASE_MS").unwrap_or(DEFAULT_RETRY_BASE_MS);

        let config = Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_attempts,
            retry_base_delay: Duration::from_millis(retry_base_ms),
            network_retry_delay: Duration::from_millis(DEFAULT_NETWORK_RETRY_MS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
            network_retry_delay: Duration::from_millis(DEFAULT_NETWORK_RETRY_MS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_delays(mut self, base: Duration, network: Duration) -> Self {
        self.retry_base_delay = base;
        self.network_retry_delay = network;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the base URL and attempt count.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ResolverError::Config(format!("invalid OPENLAWS_BASE_URL '{}': {e}", self.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ResolverError::Config(format!(
                "OPENLAWS_BASE_URL must be http(s), got '{}'",
                parsed.scheme()
            )));
        }
        if self.max_attempts == 0 {
            return Err(ResolverError::Config(
                "OPENLAWS_MAX_RETRIES must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("network_retry_delay", &self.network_retry_delay)
            .finish()
    }
}

/// Bounds on a single traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOptions {
    pub max_depth: u32,
    pub call_budget: u32,
    pub hinted_candidates: usize,
    pub unhinted_candidates: usize,
    pub pace_every: u32,
    pub pace_pause: Duration,
}

impl TraversalOptions {
    /// Defaults, with `CITELAW_MAX_API_CALLS`, `CITELAW_MAX_DEPTH`,
    /// `CITELAW_PACE_EVERY` and `CITELAW_PACE_PAUSE_MS` applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pace_every = env_parse("CITELAW_PACE_EVERY").unwrap_or(defaults.pace_every);
        let pace_pause = env_parse("CITELAW_PACE_PAUSE_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.pace_pause);

        Self {
            max_depth: env_parse("CITELAW_MAX_DEPTH").unwrap_or(defaults.max_depth),
            call_budget: env_parse("CITELAW_MAX_API_CALLS").unwrap_or(defaults.call_budget),
            ..defaults
        }
        .with_pacing(pace_every, pace_pause)
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_call_budget(mut self, call_budget: u32) -> Self {
        self.call_budget = call_budget;
        self
    }

    pub fn with_pacing(mut self, every: u32, pause: Duration) -> Self {
        self.pace_every = every;
        self.pace_pause = pause;
        self
    }

    /// How many compilations to search.
    pub fn candidate_limit(&self, hinted: bool) -> usize {
        if hinted {
            self.hinted_candidates
        } else {
            self.unhinted_candidates
        }
    }
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            call_budget: DEFAULT_CALL_BUDGET,
            hinted_candidates: DEFAULT_HINTED_CANDIDATES,
            unhinted_candidates: DEFAULT_UNHINTED_CANDIDATES,
            pace_every: DEFAULT_PACE_EVERY,
            pace_pause: Duration::from_millis(DEFAULT_PACE_PAUSE_MS),
        }
    }
}

/// Path of an optional YAML file with jurisdiction overrides.
pub fn registry_file_from_env() -> Option<PathBuf> {
    std::env::var("CITELAW_REGISTRY_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
