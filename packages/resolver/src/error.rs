//! Error types for the resolver.
//!
//! Parsing failures and "not found" are ordinary outcomes and never show up
//! here. `ResolverError` covers configuration problems, remote failures that
//! survived the retry policy, and store failures that a caller chose to
//! surface.

use thiserror::Error;

/// Failure talking to the remote law API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote rejected the request (4xx other than 429). Never retried.
    #[error("Remote rejected request to {url} (status {status}): {body}")]
    Client {
        status: u16,
        url: String,
        body: String,
    },

    /// Throttling, server or network errors persisted through every attempt.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// Request could not be built or sent (invalid URL, TLS setup, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape we expected.
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl RemoteError {
    /// True for failures caused by throttling, server trouble or the network.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

/// Failure reading or writing the persistent statute store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend-specific failure, flattened to a message at the port boundary.
    #[error("Statute store failure: {0}")]
    Backend(String),

    /// Store is reachable but the stored row could not be interpreted.
    #[error("Corrupt statute record for {citation} ({jurisdiction}): {message}")]
    CorruptRecord {
        citation: String,
        jurisdiction: String,
        message: String,
    },
}

/// Main error type for the resolver library.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// No API credential present.
    #[error("Law API is not configured: set OPENLAWS_API_KEY")]
    NotConfigured,

    /// Remote API failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Persistent store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid jurisdiction registry definition.
    #[error("Invalid jurisdiction registry: {0}")]
    Registry(String),

    /// Registry file could not be parsed.
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;
