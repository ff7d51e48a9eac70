//! Content assertions.
//!
//! Patterns are compiled when the assertion is built, so an invalid regex or
//! XPath is reported before any request is sent.

use regex::{Regex, RegexBuilder};
use url::Url;

use crate::error_handling::{ConfigError, ExtractError};
use crate::fetch::{HttpRequestSpec, RequestMethod};
use crate::parse::{compile_xpath, extract_title, strip_to_text, CompiledXPath};

/// How an expected string is compared with extracted content.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Case-insensitive substring containment. Holds the lowercased pattern.
    Contains(String),
    /// Case-insensitive equality. Holds the lowercased pattern.
    Equals(String),
    /// Regex found anywhere in the content.
    Search(Regex),
    /// Regex matching the whole content.
    FullMatch(Regex),
}

impl TextMatcher {
    /// Substring search, or regex search when `is_regex`.
    pub fn containing(pattern: &str, is_regex: bool) -> Result<Self, ConfigError> {
        if is_regex {
            Ok(TextMatcher::Search(compile_pattern(pattern, pattern)?))
        } else {
            Ok(TextMatcher::Contains(pattern.to_lowercase()))
        }
    }

    /// Equality, or a whole-string regex match when `is_regex`.
    pub fn equal_to(pattern: &str, is_regex: bool) -> Result<Self, ConfigError> {
        if is_regex {
            // Validate as written so a stray ')' is not absorbed by the anchors
            compile_pattern(pattern, pattern)?;
            let anchored = format!(r"\A(?:{pattern})\z");
            Ok(TextMatcher::FullMatch(compile_pattern(&anchored, pattern)?))
        } else {
            Ok(TextMatcher::Equals(pattern.to_lowercase()))
        }
    }

    pub fn is_match(&self, content: &str) -> bool {
        match self {
            TextMatcher::Contains(needle) => content.to_lowercase().contains(needle.as_str()),
            TextMatcher::Equals(expected) => content.to_lowercase() == *expected,
            TextMatcher::Search(re) | TextMatcher::FullMatch(re) => re.is_match(content),
        }
    }
}

/// Case-insensitive, with `.` matching newlines.
fn compile_pattern(pattern: &str, as_written: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: as_written.to_string(),
            source,
        })
}

/// What must hold for a 2xx response to count as OK.
#[derive(Debug)]
pub enum Assertion {
    /// Any 2xx status is enough; the body is not read.
    StatusOnly,
    /// Matched against the visible body text.
    TextMatch(TextMatcher),
    /// Matched against the `<title>` inside `<head>`.
    TitleMatch(TextMatcher),
    /// At least one node must match the XPath expression.
    ElementMatch(CompiledXPath),
}

impl Assertion {
    pub fn text(pattern: &str, is_regex: bool) -> Result<Self, ConfigError> {
        Ok(Assertion::TextMatch(TextMatcher::containing(pattern, is_regex)?))
    }

    pub fn title(pattern: &str, is_regex: bool) -> Result<Self, ConfigError> {
        Ok(Assertion::TitleMatch(TextMatcher::equal_to(pattern, is_regex)?))
    }

    pub fn element(expression: &str) -> Result<Self, ConfigError> {
        let xpath = compile_xpath(expression).map_err(|e| match e {
            ExtractError::InvalidExpression { expression, reason } => {
                ConfigError::InvalidExpression { expression, reason }
            }
            other => ConfigError::InvalidExpression {
                expression: expression.to_string(),
                reason: other.to_string(),
            },
        })?;
        Ok(Assertion::ElementMatch(xpath))
    }

    pub fn needs_body(&self) -> bool {
        !matches!(self, Assertion::StatusOnly)
    }

    /// Checks the fetched page.
    ///
    /// Empty body text and a missing title never match.
    pub fn evaluate(&self, html: &str) -> Result<bool, ExtractError> {
        match self {
            Assertion::StatusOnly => Ok(true),
            Assertion::TextMatch(matcher) => {
                let text = strip_to_text(html);
                Ok(!text.is_empty() && matcher.is_match(&text))
            }
            Assertion::TitleMatch(matcher) => {
                Ok(extract_title(html).is_some_and(|title| matcher.is_match(&title)))
            }
            Assertion::ElementMatch(xpath) => xpath.matches(html),
        }
    }
}

/// A request plus the assertion applied to its response.
#[derive(Debug)]
pub struct Probe {
    pub method: RequestMethod,
    /// Form fields, sent only for POST.
    pub form: Vec<(String, String)>,
    pub assertion: Assertion,
}

impl Probe {
    pub fn get(assertion: Assertion) -> Self {
        Probe {
            method: RequestMethod::Get,
            form: Vec::new(),
            assertion,
        }
    }

    pub fn post_form(form: Vec<(String, String)>, assertion: Assertion) -> Self {
        Probe {
            method: RequestMethod::Post,
            form,
            assertion,
        }
    }

    pub fn request_for(&self, url: &Url) -> HttpRequestSpec {
        match self.method {
            RequestMethod::Get => HttpRequestSpec::get(url.clone()),
            RequestMethod::Post => HttpRequestSpec::post_form(url.clone(), self.form.clone()),
        }
    }
}
