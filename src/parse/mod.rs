//! HTML content extraction.
//!
//! Pure functions over a fetched page, with no network dependency:
//! - visible body text, for text assertions
//! - the `<title>` inside `<head>`, for title assertions
//! - XPath element lookup, for element assertions
//!
//! HTML parsing goes through `scraper` and never fails on malformed markup.

mod text;
mod title;
mod xpath;

// Re-export public API
pub use text::strip_to_text;
pub use title::extract_title;
pub use xpath::{compile_xpath, evaluate_xpath, CompiledXPath};
