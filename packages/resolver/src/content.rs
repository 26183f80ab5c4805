//! Statute text normalization.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::DivisionNode;

/// Markdown heading markers at the start of a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").expect("valid regex"));

/// Inline links and images: keep the link text, drop the target.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

/// Bold and italic emphasis with `*` or `_`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EMPHASIS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\*{1,3}|\b_{1,3})([^*_\n]+?)(\*{1,3}|_{1,3}\b)").expect("valid regex")
});

/// Blockquote markers.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static QUOTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXTRA_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Text of a node ready for storage.
///
/// Plaintext wins; markdown is used only when plaintext is absent or blank.
/// Returns `None` when the node carries no text at all.
#[must_use]
pub fn clean_content(node: &DivisionNode) -> Option<String> {
    let plain = node
        .plaintext_content
        .as_deref()
        .filter(|text| !text.trim().is_empty());

    let raw = match plain {
        Some(text) => text.to_string(),
        None => strip_markdown(
            node.markdown_content
                .as_deref()
                .filter(|text| !text.trim().is_empty())?,
        ),
    };

    let cleaned = normalize_whitespace(&raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Remove headings, emphasis, links and blockquote markers.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    let text = HEADING_PATTERN.replace_all(text, "");
    let text = LINK_PATTERN.replace_all(&text, "$1");
    let text = EMPHASIS_PATTERN.replace_all(&text, "$2");
    QUOTE_PATTERN.replace_all(&text, "").into_owned()
}

/// Normalize line endings, collapse spaces and tabs, keep at most one blank
/// line between paragraphs, trim every line and the whole text.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> = unified
        .lines()
        .map(|line| INLINE_SPACE.replace_all(line, " ").trim().to_string())
        .collect();
    EXTRA_NEWLINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
