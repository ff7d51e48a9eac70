//! Request description and form field parsing.

use log::warn;
use url::Url;

/// HTTP method of a probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
        }
    }
}

/// The one request a probe run sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestSpec {
    pub method: RequestMethod,
    pub url: Url,
    /// Sent URL-encoded (UTF-8) as the body of a POST; ignored for GET.
    pub form: Vec<(String, String)>,
}

impl HttpRequestSpec {
    pub fn get(url: Url) -> Self {
        HttpRequestSpec {
            method: RequestMethod::Get,
            url,
            form: Vec::new(),
        }
    }

    pub fn post_form(url: Url, form: Vec<(String, String)>) -> Self {
        HttpRequestSpec {
            method: RequestMethod::Post,
            url,
            form,
        }
    }
}

/// Parses `"Name=Jonathan Doe, Age=23"` into form fields.
///
/// Pairs are separated by commas and split on the first `=`; keys and values
/// are trimmed. Entries without `=` or with an empty key are skipped with a
/// warning. Blank input yields no fields.
pub fn parse_key_values(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Some((key.trim().to_string(), value.trim().to_string()))
            }
            _ => {
                warn!("Skipping malformed form field '{}'", entry.trim());
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_key_values() {
        assert_eq!(
            parse_key_values("Name=Jonathan Doe, Age=23"),
            pairs(&[("Name", "Jonathan Doe"), ("Age", "23")])
        );
    }

    #[test]
    fn test_parse_key_values_blank() {
        assert!(parse_key_values("").is_empty());
        assert!(parse_key_values("  ,  ").is_empty());
    }

    #[test]
    fn test_parse_key_values_skips_malformed() {
        assert_eq!(
            parse_key_values("q=rust, orphan, =nokey, lang = en "),
            pairs(&[("q", "rust"), ("lang", "en")])
        );
    }

    #[test]
    fn test_parse_key_values_keeps_equals_in_value() {
        assert_eq!(
            parse_key_values("filter=a=b, empty="),
            pairs(&[("filter", "a=b"), ("empty", "")])
        );
    }
}
