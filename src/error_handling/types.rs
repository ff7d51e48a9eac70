//! Error type definitions.
//!
//! Configuration errors are raised before any network I/O; initialization
//! errors cover logger and HTTP client setup; extraction errors come from the
//! XPath engine after the page has been fetched.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Invalid probe input, detected before the request is sent.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The target is not a parsable absolute URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The target URL uses a scheme other than http or https.
    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    /// The expected text or title is not a valid regular expression.
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The expected element is not a valid XPath expression.
    #[error("Invalid XPath expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// A proxy user name was supplied without a proxy host.
    #[error("Proxy credentials require a proxy host")]
    ProxyCredentialsWithoutHost,
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The probe configuration cannot be turned into a client.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Failure while evaluating an XPath expression against a fetched page.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The expression could not be compiled.
    #[error("Invalid XPath expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// The expression compiled but failed at evaluation time.
    #[error("XPath evaluation failed: {0}")]
    Evaluation(String),

    /// The expression yields a number, string or boolean instead of nodes.
    #[error("XPath expression '{0}' does not select nodes")]
    NotANodeSet(String),
}
