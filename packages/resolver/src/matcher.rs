//! Section matching between citation sections and remote tree nodes.
//!
//! Remote paths spell sections with underscores (`section_2c_15_1`) while
//! citations use punctuation (`2C:15-1`), and display names use labels
//! (`Section 187.`, `§ 187`). Matching is anchored on both sides so a longer
//! numeral never matches a shorter target: `section_1870` and
//! `section_187a_subsection` do not match `187`, and `section_187` does not
//! match `18`.

use regex::Regex;

use crate::types::ChildRef;

/// Separator class shared by citations (`.`, `:`, `-`) and paths (`_`).
const SEPARATOR: &str = r"[._:\-]";

/// Precompiled matcher for one target section.
///
/// # Example
///
/// ```
/// use citelaw_resolver::matcher::SectionMatcher;
///
/// let matcher = SectionMatcher::new("187");
/// assert!(matcher.matches("pen/part_1/chapter_1/section_187"));
/// assert!(matcher.matches("Section 187. Murder"));
/// assert!(!matcher.matches("pen/part_1/chapter_1/section_1870"));
/// ```
#[derive(Debug, Clone)]
pub struct SectionMatcher {
    segment_pattern: Option<Regex>,
    label_pattern: Option<Regex>,
}

impl SectionMatcher {
    /// Build a matcher; the parenthesized subsection suffix of the target is
    /// ignored ("459(a)" matches the node for "459").
    #[must_use]
    pub fn new(target: &str) -> Self {
        let base = base_section(target).to_lowercase();
        let core = core_pattern(&base);

        let (segment_pattern, label_pattern) = match core {
            Some(core) => (
                Regex::new(&format!(
                    r"(?i)^(?:section|sec|s)?[_\-.\s]*{core}(?:$|[_\-.]$|[_\-.][^0-9]|[^0-9a-z_\-.])"
                ))
                .ok(),
                Regex::new(&format!(
                    r"(?i)(?:(?:^|[^0-9a-z])(?:section|sec\.?|§+|s\.)\s*|^\s*){core}(?:$|[^0-9a-z._:\-]|[._:\-](?:$|[^0-9a-z]))"
                ))
                .ok(),
            ),
            None => (None, None),
        };

        Self {
            segment_pattern,
            label_pattern,
        }
    }

    /// Check a path or a display label against the target.
    ///
    /// Paths are judged by their last segment so an ancestor such as
    /// `title_18` never stands in for the section itself.
    #[must_use]
    pub fn matches(&self, path_or_label: &str) -> bool {
        let segment = last_segment(path_or_label);
        let segment_hit = self
            .segment_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(segment));

        segment_hit
            || self
                .label_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(path_or_label))
    }

    /// Check a child reference by path and by display name.
    #[must_use]
    pub fn matches_node(&self, child: &ChildRef) -> bool {
        self.matches(&child.path) || self.matches(&child.display_name)
    }
}

/// Check one path or label against one target.
#[must_use]
pub fn matches(path_or_label: &str, target_section: &str) -> bool {
    SectionMatcher::new(target_section).matches(path_or_label)
}

/// Strip the parenthesized subsection suffix: "459(a)(1)" -> "459".
#[must_use]
pub fn base_section(target: &str) -> &str {
    target.split('(').next().unwrap_or(target).trim()
}

/// Case-insensitive containment where a token ending in a digit must not be
/// followed by another digit ("title_1" is not in "title_18").
#[must_use]
pub fn contains_token(haystack: &str, token: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let token = token.to_lowercase();
    if token.is_empty() {
        return false;
    }
    let numeric_tail = token.chars().last().is_some_and(|c| c.is_ascii_digit());

    haystack.match_indices(&token).any(|(start, _)| {
        !numeric_tail
            || !haystack[start + token.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
    })
}

/// Separator-tolerant pattern for a section: "2c:15-1" -> `2c[._:\-]15[._:\-]1`.
fn core_pattern(base: &str) -> Option<String> {
    let parts: Vec<String> = base
        .split(|c: char| matches!(c, '.' | ':' | '-' | '_'))
        .filter(|part| !part.is_empty())
        .map(regex::escape)
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(SEPARATOR))
    }
}

fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}
