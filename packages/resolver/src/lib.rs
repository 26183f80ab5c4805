//! citelaw resolver - Resolve free-text statute citations.
//!
//! This crate turns citations such as "Cal. Penal Code § 187",
//! "N.J.S.A. 2C:15-1" or "18 U.S.C. § 1001" into normalized statutes by
//! navigating a remote hierarchical law database, with a persistent store in
//! front of it.
//!
//! # Example
//!
//! ```
//! use citelaw_resolver::citation::CitationParser;
//! use citelaw_resolver::registry::JurisdictionRegistry;
//!
//! let registry = JurisdictionRegistry::builtin();
//! let parsed = CitationParser::new(&registry).parse("N.J.S.A. 2C:15-1").unwrap();
//! assert_eq!(parsed.jurisdiction, "NJ");
//! assert_eq!(parsed.section, "2C:15-1");
//! ```
//!
//! # Architecture
//!
//! - [`registry`]: Jurisdiction codes, citation aliases and remote law keys
//! - [`citation`]: Citation parser
//! - [`matcher`]: Section matching against remote paths and labels
//! - [`config`]: API and traversal configuration
//! - [`error`]: Error types and Result alias
//! - [`http`]: Retrying HTTP fetcher
//! - [`api`]: Remote law API client
//! - [`pacing`]: Call budget and pacing
//! - [`content`]: Statute text normalization
//! - [`traversal`]: Bounded tree search for a section
//! - [`store`]: Statute store port and in-memory store
//! - [`service`]: Cache-first resolver

pub mod api;
pub mod citation;
pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod matcher;
pub mod pacing;
pub mod registry;
pub mod service;
pub mod store;
pub mod traversal;
pub mod types;

pub use api::{DivisionsApi, HttpDivisionsApi};
pub use citation::{CitationParser, ParsedCitation, Unparseable};
pub use config::{ApiConfig, TraversalOptions};
pub use error::{RemoteError, ResolverError, Result, StoreError};
pub use http::{RetryPolicy, RetryableFetcher};
pub use pacing::{IntervalPacer, NoPacing, Pacer};
pub use registry::{JurisdictionEntry, JurisdictionRegistry};
pub use service::{Availability, CacheFirstResolver, Resolution, ResolveOptions};
pub use store::{MemoryStore, StatuteStore};
pub use traversal::{DivisionTraversal, SectionHit, TraversalReport};
pub use types::{DivisionNode, JurisdictionLevel, LawCompilation, Statute, StatuteRecord};
