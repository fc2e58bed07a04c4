//! Text normalization for the field extractors.
//!
//! Receipt evidence arrives as plain text or raw HTML; both funnel through
//! here so every extractor sees the same shape of input.

use regex::Regex;
use std::sync::LazyLock;

/// The two views the extractors work from.
pub struct NormalizedText {
    /// Line-preserving view: tags stripped, lines trimmed, blanks dropped.
    /// Used by line-oriented patterns (items, label-per-line fields).
    pub text: String,

    /// Fully collapsed view: every whitespace run is a single space.
    /// Used by most single-line field patterns.
    pub normalized: String,
}

static HTML_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[a-z!/][^>]*>").unwrap());

static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style\s*>").unwrap());

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script\s*>").unwrap());

static LINE_BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:br\s*/?|/p|/div|/li|/tr|/h[1-6]|/table)\s*>").unwrap()
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Produce the two extraction views from plain text or raw HTML.
#[must_use]
pub fn normalize(input: &str) -> NormalizedText {
    let stripped = if HTML_MARKUP.is_match(input) {
        strip_html(input)
    } else {
        input.to_string()
    };

    let text: String = stripped
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let normalized = WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string();

    NormalizedText { text, normalized }
}

/// Strip markup: drop `<style>`/`<script>` blocks entirely, turn block-level
/// closers into line breaks, remove every remaining tag, then unescape the
/// five standard entities.
fn strip_html(html: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(html, "");
    let without_blocks = STYLE_BLOCK.replace_all(&without_blocks, "");
    let with_breaks = LINE_BREAK_TAG.replace_all(&without_blocks, "\n");
    let text = HTML_MARKUP.replace_all(&with_breaks, "");

    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
