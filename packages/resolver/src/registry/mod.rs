//! Jurisdiction registry: maps jurisdiction codes to remote law compilations
//! and citation prefixes to jurisdiction codes.
//!
//! The registry is an explicitly constructed, immutable value. The parser and
//! the resolver receive it by reference; tests can build a small registry
//! with [`JurisdictionRegistry::new`].
//!
//! # Example
//!
//! ```
//! use citelaw_resolver::registry::JurisdictionRegistry;
//!
//! let registry = JurisdictionRegistry::builtin();
//! assert_eq!(registry.lookup_alias("N.J.S.A.").map(|e| e.code.as_str()), Some("NJ"));
//! assert_eq!(registry.lookup_alias("Cal.").map(|e| e.code.as_str()), Some("CA"));
//! assert!(registry.lookup_alias("XX").is_none());
//! ```

mod builtin;

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};
use crate::types::{JurisdictionLevel, LawCompilation};

pub use builtin::FEDERAL;

/// Compact section grammars a jurisdiction's citations use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStyle {
    /// Title and section joined by a colon (e.g., "2C:15-1").
    Colon,
    /// Bare hyphenated section numbers (e.g., "21-5413").
    Hyphen,
}

/// One jurisdiction known to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionEntry {
    /// Registry code (e.g., "CA", "FEDERAL").
    pub code: String,

    /// Display name (e.g., "California").
    pub name: String,

    /// Remote jurisdiction key.
    pub key: String,

    /// Remote law key of the jurisdiction's statutes.
    pub law_key: String,

    pub level: JurisdictionLevel,

    /// Citation prefixes that identify this jurisdiction.
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub section_styles: Vec<SectionStyle>,
}

impl JurisdictionEntry {
    /// The remote compilation holding this jurisdiction's statutes.
    #[must_use]
    pub fn compilation(&self) -> LawCompilation {
        LawCompilation::new(self.key.clone(), self.law_key.clone())
    }

    #[must_use]
    pub fn uses_style(&self, style: SectionStyle) -> bool {
        self.section_styles.contains(&style)
    }
}

/// On-disk registry format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub jurisdictions: Vec<JurisdictionEntry>,
}

/// Whitespace-delimited tokens with their byte spans.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("valid regex"));

/// Immutable lookup tables over a set of jurisdictions.
#[derive(Debug, Clone)]
pub struct JurisdictionRegistry {
    entries: Vec<JurisdictionEntry>,
    by_code: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    max_alias_tokens: usize,
}

impl JurisdictionRegistry {
    /// Build a registry from explicit entries.
    ///
    /// Fails if two entries share a code, or if one alias would point at two
    /// different jurisdictions.
    pub fn new(entries: Vec<JurisdictionEntry>) -> Result<Self> {
        let mut by_code = HashMap::new();
        let mut by_alias: HashMap<String, usize> = HashMap::new();
        let mut max_alias_tokens = 1;

        for (index, entry) in entries.iter().enumerate() {
            let code = entry.code.to_uppercase();
            if code.is_empty() {
                return Err(ResolverError::Registry("empty jurisdiction code".into()));
            }
            if by_code.insert(code.clone(), index).is_some() {
                return Err(ResolverError::Registry(format!(
                    "duplicate jurisdiction code '{code}'"
                )));
            }

            let names = [entry.code.as_str(), entry.name.as_str()];
            for alias in names.into_iter().chain(entry.aliases.iter().map(String::as_str)) {
                let normalized = normalize_alias(alias);
                if normalized.is_empty() {
                    continue;
                }
                match by_alias.get(&normalized) {
                    Some(&existing) if existing != index => {
                        return Err(ResolverError::Registry(format!(
                            "alias '{alias}' maps to both {} and {}",
                            entries[existing].code, entry.code
                        )));
                    }
                    _ => {
                        by_alias.insert(normalized, index);
                    }
                }
                max_alias_tokens = max_alias_tokens.max(alias.split_whitespace().count());
            }
        }

        Ok(Self {
            entries,
            by_code,
            by_alias,
            max_alias_tokens,
        })
    }

    /// The builtin table: all states, DC and the federal code.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_validated(builtin::entries())
    }

    /// Builtin table with entries replaced or added from a YAML document.
    pub fn builtin_with_yaml(yaml: &str) -> Result<Self> {
        Self::builtin().with_overrides(Self::parse_yaml(yaml)?.jurisdictions)
    }

    /// Load a registry containing only the jurisdictions in a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::new(Self::parse_yaml(yaml)?.jurisdictions)
    }

    /// Load a YAML override file and merge it over the builtin table.
    pub fn builtin_with_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading jurisdiction overrides");
        Self::builtin_with_yaml(&yaml)
    }

    /// Replace entries with matching codes and append new ones.
    pub fn with_overrides(self, overrides: Vec<JurisdictionEntry>) -> Result<Self> {
        let mut entries = self.entries;
        for entry in overrides {
            match entries
                .iter_mut()
                .find(|existing| existing.code.eq_ignore_ascii_case(&entry.code))
            {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        Self::new(entries)
    }

    fn parse_yaml(yaml: &str) -> Result<RegistryFile> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    fn from_validated(entries: Vec<JurisdictionEntry>) -> Self {
        match Self::new(entries) {
            Ok(registry) => registry,
            Err(e) => {
                // Covered by test_builtin_is_complete.
                tracing::error!(error = %e, "Builtin jurisdiction table is inconsistent");
                Self {
                    entries: Vec::new(),
                    by_code: HashMap::new(),
                    by_alias: HashMap::new(),
                    max_alias_tokens: 1,
                }
            }
        }
    }

    /// Get an entry by registry code (case-insensitive).
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&JurisdictionEntry> {
        self.by_code
            .get(&code.to_uppercase())
            .map(|&index| &self.entries[index])
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// The remote compilation for a registry code.
    #[must_use]
    pub fn compilation(&self, code: &str) -> Option<LawCompilation> {
        self.get(code).map(JurisdictionEntry::compilation)
    }

    /// Resolve a whole citation prefix (e.g., "N.J. Stat. Ann.") to an entry.
    ///
    /// Comparison ignores case, whitespace and punctuation.
    #[must_use]
    pub fn lookup_alias(&self, prefix: &str) -> Option<&JurisdictionEntry> {
        self.by_alias
            .get(&normalize_alias(prefix))
            .map(|&index| &self.entries[index])
    }

    /// Find the longest alias at the start of `text`, ending on a token boundary.
    ///
    /// Returns the entry and the remaining text after the alias.
    #[must_use]
    pub fn match_leading_alias<'t>(&self, text: &'t str) -> Option<(&JurisdictionEntry, &'t str)> {
        let spans: Vec<(usize, usize)> = TOKEN_PATTERN
            .find_iter(text)
            .take(self.max_alias_tokens)
            .map(|m| (m.start(), m.end()))
            .collect();
        let first = spans.first()?.0;

        (1..=spans.len()).rev().find_map(|count| {
            let end = spans[count - 1].1;
            self.lookup_alias(&text[first..end])
                .map(|entry| (entry, text[end..].trim()))
        })
    }

    /// Best-effort jurisdiction for a citation the parser could not handle.
    #[must_use]
    pub fn guess_jurisdiction(&self, citation: &str) -> Option<&JurisdictionEntry> {
        let normalized = normalize_alias(citation);
        if normalized.contains("usc") || normalized.starts_with("title") {
            if let Some(federal) = self.get(FEDERAL) {
                return Some(federal);
            }
        }
        self.match_leading_alias(citation.trim()).map(|(entry, _)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JurisdictionEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JurisdictionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase and keep only alphanumerics: "N.J. Stat. Ann." -> "njstatann".
#[must_use]
pub fn normalize_alias(alias: &str) -> String {
    alias
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(code: &str, aliases: &[&str]) -> JurisdictionEntry {
        JurisdictionEntry {
            code: code.to_string(),
            name: format!("State {code}"),
            key: code.to_lowercase(),
            law_key: format!("{code}-STATUTES"),
            level: JurisdictionLevel::State,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            section_styles: Vec::new(),
        }
    }

    #[test]
    fn test_builtin_is_complete() {
        let registry = JurisdictionRegistry::builtin();
        // 50 states, DC and the federal code
        assert_eq!(registry.len(), 52);
        assert!(registry.contains("CA"));
        assert!(registry.contains("dc"));
        assert!(registry.contains(FEDERAL));
    }

    #[test]
    fn test_lookup_alias_ignores_punctuation_and_case() {
        let registry = JurisdictionRegistry::builtin();
        assert_eq!(registry.lookup_alias("N.J. Stat. Ann.").unwrap().code, "NJ");
        assert_eq!(registry.lookup_alias("njsa").unwrap().code, "NJ");
        assert_eq!(registry.lookup_alias("new york").unwrap().code, "NY");
        assert_eq!(registry.lookup_alias("K.S.A.").unwrap().code, "KS");
    }

    #[test]
    fn test_match_leading_alias_prefers_longest() {
        let registry = JurisdictionRegistry::builtin();
        // "W. Va. Code" is itself an alias and outranks "W. Va."
        let (entry, rest) = registry.match_leading_alias("W. Va. Code").unwrap();
        assert_eq!(entry.code, "WV");
        assert_eq!(rest, "");

        let (entry, rest) = registry.match_leading_alias("W. Va. Crim. Code").unwrap();
        assert_eq!(entry.code, "WV");
        assert_eq!(rest, "Crim. Code");

        let (entry, rest) = registry.match_leading_alias("New York Penal").unwrap();
        assert_eq!(entry.code, "NY");
        assert_eq!(rest, "Penal");
    }

    #[test]
    fn test_match_leading_alias_unknown() {
        let registry = JurisdictionRegistry::builtin();
        assert!(registry.match_leading_alias("XX Made Up").is_none());
        assert!(registry.match_leading_alias("").is_none());
    }

    #[test]
    fn test_compilation() {
        let registry = JurisdictionRegistry::builtin();
        let compilation = registry.compilation("FEDERAL").unwrap();
        assert_eq!(compilation.jurisdiction_key, "us");
        assert_eq!(compilation.law_key, "USC");
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let result = JurisdictionRegistry::new(vec![entry("AA", &[]), entry("AA", &[])]);
        assert!(matches!(result, Err(ResolverError::Registry(_))));
    }

    #[test]
    fn test_conflicting_alias_rejected() {
        let result =
            JurisdictionRegistry::new(vec![entry("AA", &["Same."]), entry("BB", &["same"])]);
        assert!(matches!(result, Err(ResolverError::Registry(_))));
    }

    #[test]
    fn test_yaml_registry() {
        let yaml = r#"
jurisdictions:
  - code: ZZ
    name: Zedland
    key: zz
    law_key: ZZ-CODE
    level: state
    aliases: ["Zed."]
    section_styles: [colon]
"#;
        let registry = JurisdictionRegistry::from_yaml_str(yaml).unwrap();
        assert_eq!(registry.len(), 1);
        let zz = registry.lookup_alias("Zed.").unwrap();
        assert_eq!(zz.law_key, "ZZ-CODE");
        assert!(zz.uses_style(SectionStyle::Colon));
    }

    #[test]
    fn test_yaml_overrides_replace_builtin() {
        let yaml = r#"
jurisdictions:
  - code: CA
    name: California
    key: ca
    law_key: CA-OVERRIDE
    level: state
    aliases: ["Cal."]
"#;
        let registry = JurisdictionRegistry::builtin_with_yaml(yaml).unwrap();
        assert_eq!(registry.len(), 52);
        assert_eq!(registry.compilation("CA").unwrap().law_key, "CA-OVERRIDE");
    }

    #[test]
    fn test_override_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "jurisdictions:\n  - code: GU\n    name: Guam\n    key: gu\n    law_key: GU-CODE\n    level: state\n    aliases: [\"Guam Code Ann.\"]"
        )
        .unwrap();

        let registry = JurisdictionRegistry::builtin_with_file(file.path()).unwrap();
        assert_eq!(registry.len(), 53);
        assert_eq!(registry.lookup_alias("guam code ann").unwrap().code, "GU");
    }

    #[test]
    fn test_override_file_missing() {
        let result = JurisdictionRegistry::builtin_with_file(Path::new("/nonexistent/registry.yaml"));
        assert!(matches!(result, Err(ResolverError::Io(_))));
    }

    #[test]
    fn test_guess_jurisdiction() {
        let registry = JurisdictionRegistry::builtin();
        assert_eq!(
            registry.guess_jurisdiction("18 USC sec 1001 et seq").unwrap().code,
            FEDERAL
        );
        assert_eq!(
            registry.guess_jurisdiction("Cal. something odd").unwrap().code,
            "CA"
        );
        assert!(registry.guess_jurisdiction("nothing here").is_none());
    }
}
