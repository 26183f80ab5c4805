use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Resolver(#[from] citelaw_resolver::ResolverError),

    #[error(transparent)]
    Store(#[from] citelaw_store::StoreError),

    #[error(transparent)]
    Unparseable(#[from] citelaw_resolver::Unparseable),

    #[error("No statute resolved ({outcome})")]
    NotResolved { outcome: &'static str },

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
