//! Core data types: remote division nodes, normalized statutes and the
//! persisted statute record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source tag written on records imported through this resolver.
pub const DEFAULT_SOURCE_TAG: &str = "openlaws";

/// Whether a jurisdiction is a state (or DC) or the federal government.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JurisdictionLevel {
    State,
    Federal,
}

impl JurisdictionLevel {
    /// Get the string value used in the store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Federal => "federal",
        }
    }

    /// Parse a stored string value (case-insensitive).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("state") {
            Some(Self::State)
        } else if text.eq_ignore_ascii_case("federal") {
            Some(Self::Federal)
        } else {
            None
        }
    }
}

/// One statutory compilation within a jurisdiction on the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LawCompilation {
    /// Remote jurisdiction key (e.g., "ca", "us").
    pub jurisdiction_key: String,

    /// Remote law key within the jurisdiction.
    pub law_key: String,
}

impl LawCompilation {
    #[must_use]
    pub fn new(jurisdiction_key: impl Into<String>, law_key: impl Into<String>) -> Self {
        Self {
            jurisdiction_key: jurisdiction_key.into(),
            law_key: law_key.into(),
        }
    }
}

/// Reference to a child division as listed by its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    #[serde(default)]
    pub display_name: String,
    pub path: String,
}

impl ChildRef {
    #[must_use]
    pub fn new(display_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
        }
    }
}

/// A node of the remote division tree.
///
/// Content fields are only populated for content-bearing leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionNode {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub division_type: Option<String>,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub plaintext_content: Option<String>,

    #[serde(default)]
    pub markdown_content: Option<String>,

    #[serde(default, rename = "display_children")]
    pub children: Vec<ChildRef>,

    #[serde(default, alias = "url")]
    pub source_url: Option<String>,

    #[serde(default)]
    pub effective_date: Option<String>,
}

impl DivisionNode {
    /// View this node as a child reference.
    #[must_use]
    pub fn as_child_ref(&self) -> ChildRef {
        ChildRef::new(self.display_name.clone(), self.path.clone())
    }
}

/// Body of a divisions request: the law root is an array, any deeper path
/// is a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DivisionResponse {
    Root(Vec<DivisionNode>),
    Node(DivisionNode),
}

impl DivisionResponse {
    /// The child references this response exposes.
    ///
    /// For a root array that is the array itself; for a single node it is the
    /// node's `display_children`.
    #[must_use]
    pub fn child_refs(&self) -> Vec<ChildRef> {
        match self {
            Self::Root(nodes) => nodes.iter().map(DivisionNode::as_child_ref).collect(),
            Self::Node(node) => node.children.clone(),
        }
    }

    /// Consume the response into a single node, if it is one.
    #[must_use]
    pub fn into_node(self) -> Option<DivisionNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Root(mut nodes) if nodes.len() == 1 => nodes.pop(),
            Self::Root(_) => None,
        }
    }
}

/// Jurisdiction summary as returned by `GET /jurisdictions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionSummary {
    #[serde(alias = "jurisdiction_key")]
    pub key: String,

    #[serde(default, alias = "display_name")]
    pub name: String,
}

/// Law summary as returned by `GET /jurisdictions/{j}/laws`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawSummary {
    #[serde(alias = "law_key")]
    pub key: String,

    #[serde(default, alias = "display_name")]
    pub name: String,
}

/// A normalized statute, resolved from the remote tree or read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statute {
    /// Remote division path, stable across lookups.
    pub id: String,

    /// Citation exactly as the caller supplied it.
    pub citation: String,

    /// Registry jurisdiction code (e.g., "CA", "FEDERAL").
    pub jurisdiction: String,

    pub title: String,

    /// Cleaned statute text.
    pub content: String,

    /// Section identifier as parsed from the citation.
    pub section: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
}

/// A statute as persisted in the shared store, keyed by
/// `(citation, jurisdiction)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteRecord {
    pub statute: Statute,
    pub level: JurisdictionLevel,
    pub chapter: Option<String>,
    pub source: String,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
}

impl StatuteRecord {
    /// Wrap a freshly resolved statute for import.
    #[must_use]
    pub fn new(statute: Statute, level: JurisdictionLevel) -> Self {
        let chapter = chapter_from_path(&statute.id);
        Self {
            statute,
            level,
            chapter,
            source: DEFAULT_SOURCE_TAG.to_string(),
            is_active: true,
            last_updated: Utc::now(),
        }
    }

    #[must_use]
    pub fn citation(&self) -> &str {
        &self.statute.citation
    }

    #[must_use]
    pub fn jurisdiction(&self) -> &str {
        &self.statute.jurisdiction
    }
}

/// Derive a chapter label from the parent segment of a division path.
///
/// `"pen/part_1/chapter_1/section_187"` yields `"chapter_1"`.
fn chapter_from_path(path: &str) -> Option<String> {
    let mut segments = path.rsplit('/').skip(1);
    segments
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}
