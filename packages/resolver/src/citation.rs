//! Citation parsing: free-text citation to `(jurisdiction, section, hint)`.
//!
//! Formats are tried in a fixed order and the first accepted match wins.
//! Several formats are near-supersets of each other (a colon section also
//! contains hyphens, a "Code §" citation can look like a two-letter
//! fallback), so the order is part of the contract:
//!
//! 1. Federal: `18 U.S.C. § 1001`, `Title 18, § 1001`
//! 2. Colon sections: `N.J.S.A. 2C:15-1`
//! 3. Hyphen-only sections: `K.S.A. 21-5413`
//! 4. Code/Law forms: `Cal. Penal Code § 187`, `N.Y. Penal Law § 125.25`
//! 5. Two-letter fallback: `TX § 19.02`
//! 6. Bare alias: `KRS 507.020`, `ORS § 163.115`
//!
//! Every format requires its jurisdiction token to resolve in the registry.
//! An unknown prefix fails that format; it is never guessed.
//!
//! # Example
//!
//! ```
//! use citelaw_resolver::citation::CitationParser;
//! use citelaw_resolver::registry::JurisdictionRegistry;
//!
//! let registry = JurisdictionRegistry::builtin();
//! let parser = CitationParser::new(&registry);
//!
//! let parsed = parser.parse("Cal. Penal Code § 187").unwrap();
//! assert_eq!(parsed.jurisdiction, "CA");
//! assert_eq!(parsed.section, "187");
//! assert_eq!(parsed.code_hint.as_deref(), Some("penal"));
//!
//! assert!(parser.parse("XX Made Up Code § 1").is_err());
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{JurisdictionEntry, JurisdictionRegistry, SectionStyle, FEDERAL};

/// Section identifier: digits first, then letters/digits joined by `.`, `:`
/// or `-`, then any parenthesized subsections.
const SECTION: &str = r"[0-9][0-9A-Za-z]*(?:[.:\-][0-9A-Za-z]+)*(?:\([0-9A-Za-z]+\))*";

/// Section containing a colon (e.g., "2C:15-1", "630:1").
const COLON_SECTION: &str =
    r"[0-9][0-9A-Za-z]*:[0-9A-Za-z]+(?:[.:\-][0-9A-Za-z]+)*(?:\([0-9A-Za-z]+\))*";

/// Hyphenated section without colons (e.g., "21-5413", "18.2-32").
const HYPHEN_SECTION: &str =
    r"[0-9][0-9A-Za-z]*(?:\.[0-9A-Za-z]+)?-[0-9A-Za-z]+(?:[.\-][0-9A-Za-z]+)*(?:\([0-9A-Za-z]+\))*";

/// Optional section marker: "§", "§§", "Sec.", "Section".
const MARKER: &str = r"(?:§+|sec(?:tion|\.)?)";

/// Trailing punctuation tolerated after the section.
const TAIL: &str = r"[\s.,;]*$";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FEDERAL_USC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<title>\d+)\s+U\.?\s?S\.?\s?(?:C\.?(?:\s?A\.?|\s?S\.?)?|Code)\s*{MARKER}?\s*(?P<section>{SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FEDERAL_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^title\s+(?P<title>\d+)\s*,?\s*(?:U\.?\s?S\.?\s?C\.?\s*,?\s*)?{MARKER}\s*(?P<section>{SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static COLON_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<prefix>.+?)(?:\s*{MARKER}\s*|\s+)(?P<section>{COLON_SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HYPHEN_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<prefix>.+?)(?:\s*{MARKER}\s*|\s+)(?P<section>{HYPHEN_SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CODE_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<head>.+?)\s+(?:code|laws?|statutes|stat)\b\.?(?:\s+ann(?:otated|\.)?)?\s*,?\s*{MARKER}?\s*(?P<section>{SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TWO_LETTER_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<code>[a-z]{{2}})\.?(?:\s+(?P<kind>[a-z]+)\.?)?\s*{MARKER}?\s*(?P<section>{SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ALIAS_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<prefix>.+?)(?:\s*{MARKER}\s*|\s+)(?P<section>{SECTION}){TAIL}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Words that appear between a jurisdiction and "Code" without naming a
/// compilation.
const GENERIC_WORDS: &[&str] = &[
    "rev", "revised", "ann", "annotated", "gen", "general", "comp", "compiled", "consol",
    "consolidated", "cons", "official", "stat", "stats", "statutes", "code", "codes", "law",
    "laws", "sec", "section", "cent", "century", "codified", "of", "the", "and", "tit", "title",
    "ch", "chapter",
];

/// Common abbreviations of compilation names.
const KIND_ABBREVIATIONS: &[(&str, &str)] = &[
    ("pen", "penal"),
    ("veh", "vehicle"),
    ("civ", "civil"),
    ("fam", "family"),
    ("gov", "government"),
    ("govt", "government"),
    ("bus", "business"),
    ("lab", "labor"),
    ("educ", "education"),
    ("ed", "education"),
    ("fin", "financial"),
    ("ins", "insurance"),
    ("crim", "criminal"),
    ("evid", "evidence"),
    ("welf", "welfare"),
    ("corp", "corporations"),
    ("prob", "probate"),
    ("hs", "health"),
];

/// Which citation grammar accepted the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationFormat {
    Federal,
    ColonSection,
    HyphenSection,
    CodeSection,
    TwoLetter,
    AliasSection,
}

impl CitationFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Federal => "federal",
            Self::ColonSection => "colon_section",
            Self::HyphenSection => "hyphen_section",
            Self::CodeSection => "code_section",
            Self::TwoLetter => "two_letter",
            Self::AliasSection => "alias_section",
        }
    }
}

/// A citation split into the parts the resolver navigates by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedCitation {
    /// Registry code (e.g., "CA", "NJ", "FEDERAL").
    pub jurisdiction: String,

    /// Section identifier, punctuation preserved (e.g., "2C:15-1", "459(a)").
    pub section: String,

    /// Lowercase compilation keyword (e.g., "penal", "title_18").
    pub code_hint: Option<String>,

    pub format: CitationFormat,
}

/// No citation grammar accepted the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse citation: '{input}'")]
pub struct Unparseable {
    pub input: String,
}

/// Parses citations against a jurisdiction registry.
#[derive(Debug, Clone, Copy)]
pub struct CitationParser<'r> {
    registry: &'r JurisdictionRegistry,
}

impl<'r> CitationParser<'r> {
    #[must_use]
    pub fn new(registry: &'r JurisdictionRegistry) -> Self {
        Self { registry }
    }

    /// Parse a raw citation.
    ///
    /// Deterministic: the same input always yields the same result.
    pub fn parse(&self, raw: &str) -> Result<ParsedCitation, Unparseable> {
        let input = normalize_input(raw);

        let parsed = self
            .parse_federal(&input)
            .or_else(|| self.parse_colon(&input))
            .or_else(|| self.parse_hyphen(&input))
            .or_else(|| self.parse_code(&input))
            .or_else(|| self.parse_two_letter(&input))
            .or_else(|| self.parse_alias(&input));

        match parsed {
            Some(parsed) => {
                tracing::trace!(
                    citation = raw,
                    jurisdiction = %parsed.jurisdiction,
                    section = %parsed.section,
                    format = parsed.format.as_str(),
                    "Parsed citation"
                );
                Ok(parsed)
            }
            None => {
                tracing::debug!(citation = raw, "No citation format matched");
                Err(Unparseable {
                    input: raw.to_string(),
                })
            }
        }
    }

    fn parse_federal(&self, input: &str) -> Option<ParsedCitation> {
        let caps = FEDERAL_USC
            .captures(input)
            .or_else(|| FEDERAL_TITLE.captures(input))?;
        let federal = self.registry.get(FEDERAL)?;
        let title = caps.name("title")?.as_str().trim_start_matches('0');
        let title = if title.is_empty() { "0" } else { title };

        Some(build(
            federal,
            &caps,
            Some(format!("title_{title}")),
            CitationFormat::Federal,
        ))
    }

    fn parse_colon(&self, input: &str) -> Option<ParsedCitation> {
        let caps = COLON_FORM.captures(input)?;
        let entry = self
            .registry
            .lookup_alias(caps.name("prefix")?.as_str())
            .filter(|entry| entry.uses_style(SectionStyle::Colon))?;

        Some(build(entry, &caps, None, CitationFormat::ColonSection))
    }

    fn parse_hyphen(&self, input: &str) -> Option<ParsedCitation> {
        let caps = HYPHEN_FORM.captures(input)?;
        let entry = self
            .registry
            .lookup_alias(caps.name("prefix")?.as_str())
            .filter(|entry| entry.uses_style(SectionStyle::Hyphen))?;

        Some(build(entry, &caps, None, CitationFormat::HyphenSection))
    }

    fn parse_code(&self, input: &str) -> Option<ParsedCitation> {
        let caps = CODE_FORM.captures(input)?;
        let head = caps.name("head")?.as_str();
        let (entry, rest) = self.registry.match_leading_alias(head)?;

        Some(build(entry, &caps, code_hint(rest), CitationFormat::CodeSection))
    }

    fn parse_two_letter(&self, input: &str) -> Option<ParsedCitation> {
        let caps = TWO_LETTER_FORM.captures(input)?;
        let entry = self.registry.get(caps.name("code")?.as_str())?;
        let hint = caps.name("kind").and_then(|kind| code_hint(kind.as_str()));

        Some(build(entry, &caps, hint, CitationFormat::TwoLetter))
    }

    /// Whole-prefix alias followed directly by the section ("KRS 507.020").
    fn parse_alias(&self, input: &str) -> Option<ParsedCitation> {
        let caps = ALIAS_FORM.captures(input)?;
        let entry = self.registry.lookup_alias(caps.name("prefix")?.as_str())?;

        Some(build(entry, &caps, None, CitationFormat::AliasSection))
    }
}

fn build(
    entry: &JurisdictionEntry,
    caps: &Captures<'_>,
    code_hint: Option<String>,
    format: CitationFormat,
) -> ParsedCitation {
    let section = caps
        .name("section")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    ParsedCitation {
        jurisdiction: entry.code.clone(),
        section,
        code_hint,
        format,
    }
}

/// Extract the compilation keyword from the words between a jurisdiction
/// alias and "Code"/"Law".
///
/// "Penal" -> "penal", "Veh." -> "vehicle", "Health & Safety" -> "health",
/// "Rev." -> none.
fn code_hint(words: &str) -> Option<String> {
    words
        .split(|c: char| c.is_whitespace() || c == '&' || c == ',')
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .find(|word| {
            word.chars().all(|c| c.is_ascii_alphabetic()) && !GENERIC_WORDS.contains(&word.as_str())
        })
        .map(|word| {
            KIND_ABBREVIATIONS
                .iter()
                .find(|(abbreviation, _)| *abbreviation == word)
                .map(|(_, full)| (*full).to_string())
                .unwrap_or(word)
        })
}

/// Trim, unify dashes and collapse whitespace (including non-breaking spaces).
fn normalize_input(raw: &str) -> String {
    let unified: String = raw
        .chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '\u{00a0}' | '\u{2009}' | '\u{202f}' => ' ',
            other => other,
        })
        .collect();
    WHITESPACE.replace_all(unified.trim(), " ").into_owned()
}
