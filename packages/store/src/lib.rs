//! citelaw store - PostgreSQL statute store.
//!
//! Implements the resolver's [`StatuteStore`](citelaw_resolver::StatuteStore)
//! port on a `statutes` table keyed by `(citation, jurisdiction)`.

pub mod config;
pub mod db;
pub mod error;
pub mod statutes;

pub use config::StoreConfig;
pub use db::{create_pool, run_migrations};
pub use error::{Result, StoreError};
pub use statutes::{PgStatuteStore, StatuteRow};
