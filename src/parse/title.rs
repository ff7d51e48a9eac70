//! Page title extraction.

use regex::Regex;
use std::sync::LazyLock;

/// First `<title>` inside `<head>`, across newlines, any case.
const TITLE_PATTERN: &str = r"(?is)<head.*?>.*?<title.*?>(.*?)</title>.*?</head>";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(TITLE_PATTERN).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in TITLE_RE: {}. This is a programming error.",
            TITLE_PATTERN, e
        )
    })
});

/// Extracts the page title from raw HTML.
///
/// The title is located on the markup itself rather than on a parsed DOM, so
/// a `<title>` outside `<head>` is ignored and entities are not decoded.
/// Returns the trimmed title, or `None` when the page has none.
pub fn extract_title(html: &str) -> Option<String> {
    let title = TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());
    log::debug!("Extracted title: {:?}", title);
    title
}
