//! Persistent statute store port.
//!
//! The resolver only needs point reads and upserts keyed by
//! `(citation, jurisdiction)`. The PostgreSQL adapter lives in the
//! `citelaw-store` crate; [`MemoryStore`] serves tests and one-shot CLI runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::types::StatuteRecord;

/// Trait for statute stores, enabling mocking in tests.
#[async_trait]
pub trait StatuteStore: Send + Sync {
    /// Look up a previously imported statute.
    async fn get(
        &self,
        citation: &str,
        jurisdiction: &str,
    ) -> Result<Option<StatuteRecord>, StoreError>;

    /// Insert or replace the record for its `(citation, jurisdiction)` key.
    async fn upsert(&self, record: &StatuteRecord) -> Result<(), StoreError>;
}

type StoreKey = (String, String);

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<StoreKey, StatuteRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StatuteStore for MemoryStore {
    async fn get(
        &self,
        citation: &str,
        jurisdiction: &str,
    ) -> Result<Option<StatuteRecord>, StoreError> {
        let key = (citation.to_string(), jurisdiction.to_string());
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn upsert(&self, record: &StatuteRecord) -> Result<(), StoreError> {
        let key = (
            record.citation().to_string(),
            record.jurisdiction().to_string(),
        );
        self.records.write().await.insert(key, record.clone());
        Ok(())
    }
}

/// Test utilities for the store port.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// A store whose every operation fails.
    #[derive(Debug, Default)]
    pub struct FailingStore {
        attempts: AtomicU32,
    }

    impl FailingStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Operations attempted so far.
        pub fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatuteStore for FailingStore {
        async fn get(
            &self,
            _citation: &str,
            _jurisdiction: &str,
        ) -> Result<Option<StatuteRecord>, StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn upsert(&self, _record: &StatuteRecord) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend("connection refused".into()))
        }
    }
}
