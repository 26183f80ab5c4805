//! Store error type and its mapping onto the resolver port error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("corrupt statute row for {citation} ({jurisdiction}): {message}")]
    CorruptRow {
        citation: String,
        jurisdiction: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for citelaw_resolver::StoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CorruptRow {
                citation,
                jurisdiction,
                message,
            } => Self::CorruptRecord {
                citation,
                jurisdiction,
                message,
            },
            other => Self::Backend(other.to_string()),
        }
    }
}
