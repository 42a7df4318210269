//! Markup sanitizing and plain-text helpers
//!
//! These operate on raw markup strings with regular expressions, so they stay
//! tolerant of unbalanced or malformed tags.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("script regex is valid"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").expect("style regex is valid"));
static NOSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<noscript\b.*?</noscript\s*>").expect("noscript regex is valid")
});
static IFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b.*?</iframe\s*>").expect("iframe regex is valid"));
static EVENT_HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\son[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("event handler regex is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex is valid"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Maximum excerpt length in characters
pub const EXCERPT_CHARS: usize = 600;

/// Removes `<script>`, `<style>`, `<noscript>`, `<iframe>` elements and inline
/// `on*` event-handler attributes
pub fn sanitize_html(html: &str) -> String {
    let out = SCRIPT_RE.replace_all(html, "");
    let out = STYLE_RE.replace_all(&out, "");
    let out = NOSCRIPT_RE.replace_all(&out, "");
    let out = EVENT_HANDLER_RE.replace_all(&out, "");
    IFRAME_RE.replace_all(&out, "").into_owned()
}

/// Replaces every tag with a space, dropping script and style bodies
pub fn strip_tags(html: &str) -> String {
    let out = SCRIPT_RE.replace_all(html, "");
    let out = STYLE_RE.replace_all(&out, "");
    TAG_RE.replace_all(&out, " ").into_owned()
}

/// Collapses whitespace runs into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Decodes the five common HTML entities
///
/// `&amp;` is decoded last so `&amp;lt;` becomes `&lt;`, not `<`.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Renders markup as decoded, whitespace-collapsed plain text
pub fn to_plain_text(html: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(html)))
}

/// Returns the first [`EXCERPT_CHARS`] characters of a text
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
