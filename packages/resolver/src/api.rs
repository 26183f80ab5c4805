//! Client for the remote hierarchical law API.
//!
//! Endpoints:
//! - `GET /jurisdictions`
//! - `GET /jurisdictions/{j}/laws`
//! - `GET /jurisdictions/{j}/laws/{l}/divisions[/{path}]?depth=n`
//!
//! The API has no "lookup by section" endpoint; [`DivisionsApi`] exposes
//! exactly what the traversal needs and is the seam for test doubles.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::RemoteError;
use crate::http::RetryableFetcher;
use crate::types::{DivisionResponse, JurisdictionSummary, LawCompilation, LawSummary};

/// Trait for law API clients, enabling mocking in tests.
#[async_trait]
pub trait DivisionsApi: Send + Sync {
    /// True if a credential is present; without one no call should be made.
    fn is_configured(&self) -> bool;

    async fn list_jurisdictions(&self) -> Result<Vec<JurisdictionSummary>, RemoteError>;

    async fn list_laws(&self, jurisdiction_key: &str) -> Result<Vec<LawSummary>, RemoteError>;

    /// Fetch a division `depth` levels deep. `None` fetches the law root.
    async fn fetch_division(
        &self,
        compilation: &LawCompilation,
        path: Option<&str>,
        depth: u32,
    ) -> Result<DivisionResponse, RemoteError>;
}

/// Listing endpoints answer either with a bare array or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// HTTP implementation on top of [`RetryableFetcher`].
#[derive(Debug)]
pub struct HttpDivisionsApi {
    base_url: String,
    fetcher: RetryableFetcher,
    configured: bool,
}

impl HttpDivisionsApi {
    pub fn new(config: &ApiConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            base_url: config.base_url().to_string(),
            fetcher: RetryableFetcher::new(config)?,
            configured: config.is_configured(),
        })
    }

    /// URL of a division. Each path segment is percent-encoded; slashes
    /// between segments are kept.
    #[must_use]
    pub fn division_url(&self, compilation: &LawCompilation, path: Option<&str>) -> String {
        let mut url = format!(
            "{}/jurisdictions/{}/laws/{}/divisions",
            self.base_url,
            urlencoding::encode(&compilation.jurisdiction_key),
            urlencoding::encode(&compilation.law_key)
        );
        if let Some(path) = path {
            for segment in path.split('/').filter(|segment| !segment.is_empty()) {
                url.push('/');
                url.push_str(&urlencoding::encode(segment));
            }
        }
        url
    }
}

#[async_trait]
impl DivisionsApi for HttpDivisionsApi {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn list_jurisdictions(&self) -> Result<Vec<JurisdictionSummary>, RemoteError> {
        let url = format!("{}/jurisdictions", self.base_url);
        let listing: Listing<JurisdictionSummary> = self.fetcher.get_json(&url, &[]).await?;
        Ok(listing.into_vec())
    }

    async fn list_laws(&self, jurisdiction_key: &str) -> Result<Vec<LawSummary>, RemoteError> {
        let url = format!(
            "{}/jurisdictions/{}/laws",
            self.base_url,
            urlencoding::encode(jurisdiction_key)
        );
        let listing: Listing<LawSummary> = self.fetcher.get_json(&url, &[]).await?;
        Ok(listing.into_vec())
    }

    async fn fetch_division(
        &self,
        compilation: &LawCompilation,
        path: Option<&str>,
        depth: u32,
    ) -> Result<DivisionResponse, RemoteError> {
        let url = self.division_url(compilation, path);
        tracing::trace!(url = %url, depth, "Fetching division");
        self.fetcher
            .get_json(&url, &[("depth", depth.to_string())])
            .await
    }
}

/// Test utilities for the law API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::types::{ChildRef, DivisionNode};

    /// In-memory division tree. Unknown paths answer 404; paths marked as
    /// failing answer as if retries were exhausted.
    pub struct FakeDivisionsApi {
        root: Vec<DivisionNode>,
        nodes: HashMap<String, DivisionNode>,
        failing: HashSet<String>,
        configured: bool,
        calls: AtomicU32,
        requested: Mutex<Vec<String>>,
    }

    impl FakeDivisionsApi {
        pub fn new(root: Vec<DivisionNode>) -> Self {
            Self {
                root,
                nodes: HashMap::new(),
                failing: HashSet::new(),
                configured: true,
                calls: AtomicU32::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        pub fn with_node(mut self, node: DivisionNode) -> Self {
            self.nodes.insert(node.path.clone(), node);
            self
        }

        pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = DivisionNode>) -> Self {
            for node in nodes {
                self.nodes.insert(node.path.clone(), node);
            }
            self
        }

        pub fn failing(mut self, path: &str) -> Self {
            self.failing.insert(path.to_string());
            self
        }

        pub fn unconfigured(mut self) -> Self {
            self.configured = false;
            self
        }

        /// Remote calls made so far (listings included).
        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        /// Division paths requested, in order; the law root is `""`.
        pub fn requested(&self) -> Vec<String> {
            self.requested
                .lock()
                .map(|paths| paths.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl DivisionsApi for FakeDivisionsApi {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn list_jurisdictions(&self) -> Result<Vec<JurisdictionSummary>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                JurisdictionSummary {
                    key: "ca".into(),
                    name: "California".into(),
                },
                JurisdictionSummary {
                    key: "us".into(),
                    name: "United States".into(),
                },
            ])
        }

        async fn list_laws(&self, _jurisdiction_key: &str) -> Result<Vec<LawSummary>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn fetch_division(
            &self,
            _compilation: &LawCompilation,
            path: Option<&str>,
            _depth: u32,
        ) -> Result<DivisionResponse, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut requested) = self.requested.lock() {
                requested.push(path.unwrap_or_default().to_string());
            }

            let Some(path) = path else {
                return Ok(DivisionResponse::Root(self.root.clone()));
            };
            if self.failing.contains(path) {
                return Err(RemoteError::RetriesExhausted {
                    attempts: 3,
                    message: "Rate limited: 429 Too Many Requests".into(),
                });
            }
            self.nodes
                .get(path)
                .cloned()
                .map(DivisionResponse::Node)
                .ok_or_else(|| RemoteError::Client {
                    status: 404,
                    url: path.to_string(),
                    body: "not found".into(),
                })
        }
    }

    /// A node with children and no text.
    pub fn branch(path: &str, name: &str, children: &[(&str, &str)]) -> DivisionNode {
        DivisionNode {
            path: path.to_string(),
            display_name: name.to_string(),
            division_type: Some("chapter".into()),
            children: children
                .iter()
                .map(|(name, path)| ChildRef::new(*name, *path))
                .collect(),
            ..DivisionNode::default()
        }
    }

    /// A content leaf.
    pub fn leaf(path: &str, name: &str, text: &str) -> DivisionNode {
        DivisionNode {
            path: path.to_string(),
            display_name: name.to_string(),
            division_type: Some("section".into()),
            plaintext_content: Some(text.to_string()),
            ..DivisionNode::default()
        }
    }
}
