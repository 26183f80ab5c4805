//! Cache-first citation resolution.
//!
//! A lookup goes parse, store, remote traversal, optional import. The store
//! is consulted before anything else so a previously imported statute costs
//! zero remote calls, and store trouble only ever degrades to a cache miss.

use std::sync::Arc;

use serde::Serialize;

use crate::api::{DivisionsApi, HttpDivisionsApi};
use crate::citation::{CitationParser, ParsedCitation, Unparseable};
use crate::config::{registry_file_from_env, ApiConfig, TraversalOptions};
use crate::error::Result;
use crate::pacing::{IntervalPacer, Pacer};
use crate::registry::JurisdictionRegistry;
use crate::store::StatuteStore;
use crate::traversal::{DivisionTraversal, SectionHit};
use crate::types::{JurisdictionLevel, Statute, StatuteRecord};

/// Per-request options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Write a freshly resolved statute to the store.
    pub import_if_found: bool,
}

impl ResolveOptions {
    #[must_use]
    pub fn importing() -> Self {
        Self {
            import_if_found: true,
        }
    }
}

/// Outcome of a resolution. Only unexpected failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the store without touching the remote API.
    Cached(Statute),

    /// Found by traversal. `imported` is true if the store write succeeded.
    Resolved { statute: Statute, imported: bool },

    /// Parsed, but the section was not found within the search bounds.
    NotFound { parsed: ParsedCitation },

    /// No citation format accepted the input.
    Unparseable(Unparseable),

    /// No API credential; nothing was fetched.
    NotConfigured { parsed: ParsedCitation },
}

impl Resolution {
    #[must_use]
    pub fn statute(&self) -> Option<&Statute> {
        match self {
            Self::Cached(statute) | Self::Resolved { statute, .. } => Some(statute),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_statute(self) -> Option<Statute> {
        match self {
            Self::Cached(statute) | Self::Resolved { statute, .. } => Some(statute),
            _ => None,
        }
    }

    /// Short machine-readable outcome name.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Cached(_) => "cached",
            Self::Resolved { .. } => "resolved",
            Self::NotFound { .. } => "not_found",
            Self::Unparseable(_) => "unparseable",
            Self::NotConfigured { .. } => "not_configured",
        }
    }
}

/// Whether the remote API can be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub message: String,

    /// Jurisdictions the remote reported, when it could be reached.
    pub jurisdiction_count: Option<usize>,
}

/// Resolves citations against the store first and the remote tree second.
#[derive(Clone)]
pub struct CacheFirstResolver {
    registry: Arc<JurisdictionRegistry>,
    api: Arc<dyn DivisionsApi>,
    store: Arc<dyn StatuteStore>,
    pacer: Arc<dyn Pacer>,
    options: TraversalOptions,
}

impl CacheFirstResolver {
    /// Build a resolver with default traversal bounds and interval pacing.
    pub fn new(
        registry: Arc<JurisdictionRegistry>,
        api: Arc<dyn DivisionsApi>,
        store: Arc<dyn StatuteStore>,
    ) -> Self {
        let options = TraversalOptions::default();
        Self {
            registry,
            api,
            store,
            pacer: Arc::new(pacer_for(&options)),
            options,
        }
    }

    /// Build the HTTP-backed resolver from explicit configuration.
    pub fn from_config(
        config: &ApiConfig,
        options: TraversalOptions,
        registry: JurisdictionRegistry,
        store: Arc<dyn StatuteStore>,
    ) -> Result<Self> {
        config.validate()?;
        let api = HttpDivisionsApi::new(config)?;
        Ok(Self::new(Arc::new(registry), Arc::new(api), store).with_options(options))
    }

    /// Build the HTTP-backed resolver from `OPENLAWS_*` and `CITELAW_*`
    /// environment variables.
    pub fn from_env(store: Arc<dyn StatuteStore>) -> Result<Self> {
        let config = ApiConfig::from_env()?;
        let registry = match registry_file_from_env() {
            Some(path) => JurisdictionRegistry::builtin_with_file(&path)?,
            None => JurisdictionRegistry::builtin(),
        };
        Self::from_config(&config, TraversalOptions::from_env(), registry, store)
    }

    /// Replace the traversal bounds. Also resets pacing to the interval
    /// pacer those options describe; call [`with_pacer`](Self::with_pacer)
    /// afterwards to override it.
    #[must_use]
    pub fn with_options(mut self, options: TraversalOptions) -> Self {
        self.pacer = Arc::new(pacer_for(&options));
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &JurisdictionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Parse a citation with this resolver's registry.
    pub fn parse(&self, citation: &str) -> std::result::Result<ParsedCitation, Unparseable> {
        CitationParser::new(&self.registry).parse(citation)
    }

    /// Resolve a citation.
    ///
    /// Errors only when the law root could not be fetched after retries;
    /// every other failure is an outcome or a logged degradation.
    pub async fn resolve(&self, citation: &str, options: ResolveOptions) -> Result<Resolution> {
        let parsed = self.parse(citation);
        let jurisdiction = match &parsed {
            Ok(parsed) => Some(parsed.jurisdiction.clone()),
            Err(_) => self
                .registry
                .guess_jurisdiction(citation)
                .map(|entry| entry.code.clone()),
        };

        if let Some(jurisdiction) = &jurisdiction {
            if let Some(statute) = self.cached(citation, jurisdiction).await {
                tracing::debug!(citation, jurisdiction = %jurisdiction, "Served from store");
                return Ok(Resolution::Cached(statute));
            }
        }

        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(unparseable) => {
                tracing::info!(citation, "Citation not recognized");
                return Ok(Resolution::Unparseable(unparseable));
            }
        };

        if !self.api.is_configured() {
            tracing::warn!(citation, "Law API not configured, skipping remote lookup");
            return Ok(Resolution::NotConfigured { parsed });
        }

        let Some(compilation) = self.registry.compilation(&parsed.jurisdiction) else {
            return Ok(Resolution::NotFound { parsed });
        };

        let traversal = DivisionTraversal::new(self.api.as_ref(), self.pacer.as_ref(), &self.options);
        let hit = traversal
            .search(
                &compilation,
                &parsed.section,
                parsed.code_hint.as_deref(),
                self.options.max_depth,
            )
            .await?;

        let Some(hit) = hit else {
            return Ok(Resolution::NotFound { parsed });
        };

        let statute = statute_from_hit(citation, &parsed, hit);
        let imported = options.import_if_found && self.import(&statute, &parsed).await;

        Ok(Resolution::Resolved { statute, imported })
    }

    /// Resolve and keep only the statute.
    pub async fn get_statute_by_citation(
        &self,
        citation: &str,
        options: ResolveOptions,
    ) -> Result<Option<Statute>> {
        Ok(self.resolve(citation, options).await?.into_statute())
    }

    /// Check the credential and, if present, that the remote answers.
    pub async fn check_availability(&self) -> Availability {
        if !self.api.is_configured() {
            return Availability {
                available: false,
                message: "Law API key not configured (set OPENLAWS_API_KEY)".to_string(),
                jurisdiction_count: None,
            };
        }

        match self.api.list_jurisdictions().await {
            Ok(jurisdictions) => Availability {
                available: true,
                message: format!("Law API reachable, {} jurisdictions", jurisdictions.len()),
                jurisdiction_count: Some(jurisdictions.len()),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Law API availability check failed");
                Availability {
                    available: false,
                    message: format!("Law API unreachable: {e}"),
                    jurisdiction_count: None,
                }
            }
        }
    }

    /// Look up a California code section, e.g. `("Penal", "187")`.
    pub async fn get_california_statute(
        &self,
        code: &str,
        section: &str,
        options: ResolveOptions,
    ) -> Result<Option<Statute>> {
        self.get_statute_by_citation(&format!("Cal. {code} Code § {section}"), options)
            .await
    }

    /// Look up a United States Code section, e.g. `(18, "1001")`.
    pub async fn get_federal_statute(
        &self,
        title: u32,
        section: &str,
        options: ResolveOptions,
    ) -> Result<Option<Statute>> {
        self.get_statute_by_citation(&format!("{title} U.S.C. § {section}"), options)
            .await
    }

    /// Look up a New Jersey statute, e.g. `"2C:15-1"`.
    pub async fn get_new_jersey_statute(
        &self,
        section: &str,
        options: ResolveOptions,
    ) -> Result<Option<Statute>> {
        self.get_statute_by_citation(&format!("N.J.S.A. {section}"), options)
            .await
    }

    /// Look up a New York consolidated law section, e.g. `("Penal", "125.25")`.
    pub async fn get_new_york_statute(
        &self,
        law: &str,
        section: &str,
        options: ResolveOptions,
    ) -> Result<Option<Statute>> {
        self.get_statute_by_citation(&format!("N.Y. {law} Law § {section}"), options)
            .await
    }

    async fn cached(&self, citation: &str, jurisdiction: &str) -> Option<Statute> {
        match self.store.get(citation, jurisdiction).await {
            Ok(Some(record)) if record.is_active => Some(record.statute),
            Ok(Some(_)) => {
                tracing::debug!(citation, jurisdiction, "Stored statute is inactive");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(citation, jurisdiction, error = %e, "Store lookup failed, treating as miss");
                None
            }
        }
    }

    async fn import(&self, statute: &Statute, parsed: &ParsedCitation) -> bool {
        let level = self
            .registry
            .get(&parsed.jurisdiction)
            .map_or(JurisdictionLevel::State, |entry| entry.level);
        let record = StatuteRecord::new(statute.clone(), level);

        match self.store.upsert(&record).await {
            Ok(()) => {
                tracing::info!(
                    citation = %statute.citation,
                    jurisdiction = %statute.jurisdiction,
                    "Imported statute"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    citation = %statute.citation,
                    jurisdiction = %statute.jurisdiction,
                    error = %e,
                    "Failed to import statute"
                );
                false
            }
        }
    }
}

fn pacer_for(options: &TraversalOptions) -> IntervalPacer {
    IntervalPacer::new(options.pace_every, options.pace_pause)
}

fn statute_from_hit(citation: &str, parsed: &ParsedCitation, hit: SectionHit) -> Statute {
    let node = hit.node;
    let title = if node.display_name.trim().is_empty() {
        format!("Section {}", parsed.section)
    } else {
        node.display_name.trim().to_string()
    };

    Statute {
        id: node.path,
        citation: citation.to_string(),
        jurisdiction: parsed.jurisdiction.clone(),
        title,
        content: hit.content,
        section: parsed.section.clone(),
        source_url: node.source_url,
        effective_date: node.effective_date,
    }
}
