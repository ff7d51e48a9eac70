//! Network failure categorization.
//!
//! Turns a transport error into one of a closed set of failure kinds. reqwest
//! only exposes coarse predicates (`is_timeout`, `is_connect`, ...), so the
//! source chain is walked for `io::Error` kinds and the TLS backend's error
//! type first. Rendered messages are inspected for DNS and certificate
//! patterns after that.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::Duration;

use strum_macros::EnumIter;
use thiserror::Error;

/// What went wrong when no HTTP response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum NetworkFailureKind {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Name resolution failed.
    UnknownHost,
    /// The host or its network is unreachable.
    NoRouteToHost,
    /// The TLS handshake failed, typically on certificate validation.
    UntrustedCertificate,
    /// The peer actively refused the TCP connection.
    ConnectionRefused,
    /// The proxy rejected the CONNECT tunnel with 407.
    ProxyAuthenticationRequired,
    /// The request could not be built from the URL.
    InvalidUrl,
    Other,
}

impl NetworkFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkFailureKind::Timeout => "request timed out",
            NetworkFailureKind::UnknownHost => "unknown host",
            NetworkFailureKind::NoRouteToHost => "no route to host",
            NetworkFailureKind::UntrustedCertificate => "server certificate not trusted",
            NetworkFailureKind::ConnectionRefused => "connection refused",
            NetworkFailureKind::ProxyAuthenticationRequired => "proxy authentication required",
            NetworkFailureKind::InvalidUrl => "invalid request URL",
            NetworkFailureKind::Other => "network error",
        }
    }
}

impl fmt::Display for NetworkFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized transport failure with its full diagnostic text.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct NetworkFailure {
    pub kind: NetworkFailureKind,
    /// Every message in the error's source chain, joined with ": ".
    pub message: String,
}

impl NetworkFailure {
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        NetworkFailure {
            kind: categorize_reqwest_error(error),
            message: error_chain_message(error),
        }
    }

    /// The exchange as a whole outlasted `timeout`.
    pub fn timed_out(timeout: Duration) -> Self {
        NetworkFailure {
            kind: NetworkFailureKind::Timeout,
            message: format!("no complete response within {} ms", timeout.as_millis()),
        }
    }
}

/// Categorizes a `reqwest::Error` into a `NetworkFailureKind`.
///
/// reqwest's own predicates are checked first since they are reliable for
/// timeouts and builder errors; everything else is decided from the errors
/// below it by [`categorize_source_chain`].
pub fn categorize_reqwest_error(error: &reqwest::Error) -> NetworkFailureKind {
    if error.is_timeout() {
        return NetworkFailureKind::Timeout;
    }
    if error.is_builder() {
        return NetworkFailureKind::InvalidUrl;
    }
    categorize_source_chain(error)
}

/// Categorizes by the causes of `error` only, never by its own message.
///
/// reqwest renders the request URL into its top-level message, so a path like
/// `/ssl-health` must not take part in pattern matching.
pub fn categorize_source_chain(error: &(dyn StdError + 'static)) -> NetworkFailureKind {
    match error.source() {
        Some(source) => categorize_error_chain(source),
        None => NetworkFailureKind::Other,
    }
}

/// Categorizes any error by the error types and messages in its chain.
pub fn categorize_error_chain(error: &(dyn StdError + 'static)) -> NetworkFailureKind {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::TimedOut => return NetworkFailureKind::Timeout,
                io::ErrorKind::ConnectionRefused => return NetworkFailureKind::ConnectionRefused,
                io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                    return NetworkFailureKind::NoRouteToHost
                }
                _ => {}
            }
        }
        // The TLS backend only appears in the chain when the handshake failed
        if err.is::<native_tls::Error>() {
            return NetworkFailureKind::UntrustedCertificate;
        }
        current = err.source();
    }

    let msg = error_chain_message(error).to_lowercase();

    // hyper reports "dns error" around the resolver's own text, which varies
    // by platform
    if DNS_PATTERNS.iter().any(|p| msg.contains(p)) {
        return NetworkFailureKind::UnknownHost;
    }

    // https through a proxy: a 407 on CONNECT never surfaces as a response
    if msg.contains("proxy authentication required")
        || msg.contains("proxy authorization required")
    {
        return NetworkFailureKind::ProxyAuthenticationRequired;
    }

    if CERTIFICATE_PATTERNS.iter().any(|p| msg.contains(p)) {
        return NetworkFailureKind::UntrustedCertificate;
    }

    if msg.contains("connection refused") {
        return NetworkFailureKind::ConnectionRefused;
    }
    if msg.contains("no route to host") || msg.contains("network is unreachable") {
        return NetworkFailureKind::NoRouteToHost;
    }
    if msg.contains("timed out") {
        return NetworkFailureKind::Timeout;
    }

    NetworkFailureKind::Other
}

const DNS_PATTERNS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
];

/// Certificate verification failures as worded by OpenSSL, rustls,
/// Security.framework and SChannel.
const CERTIFICATE_PATTERNS: &[&str] = &[
    "certificate verify failed",
    "invalid peer certificate",
    "self signed certificate",
    "self-signed certificate",
    "unable to get local issuer certificate",
    "certificate has expired",
    "certificate is not valid for",
    "hostname mismatch",
    "certificate was not trusted",
    "issued by an authority that is not trusted",
];

/// Renders an error and all of its sources as one line.
pub fn error_chain_message(error: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut current = error.source();
    while let Some(err) = current {
        let text = err.to_string();
        // hyper and reqwest often repeat the inner message verbatim
        if parts.last().is_none_or(|last| !last.contains(&text)) {
            parts.push(text);
        }
        current = err.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mimics a transport error wrapping an inner cause.
    #[derive(Debug, Error)]
    #[error("{context}")]
    struct Wrapped {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    }

    fn wrap(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Wrapped {
        Wrapped {
            context,
            source: Box::new(source),
        }
    }

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct Leaf(&'static str);

    #[test]
    fn test_io_kinds_in_chain() {
        let refused = wrap(
            "error sending request",
            wrap("tcp connect error", io::Error::from(io::ErrorKind::ConnectionRefused)),
        );
        assert_eq!(
            categorize_error_chain(&refused),
            NetworkFailureKind::ConnectionRefused
        );

        let unreachable = wrap(
            "error sending request",
            io::Error::from(io::ErrorKind::HostUnreachable),
        );
        assert_eq!(
            categorize_error_chain(&unreachable),
            NetworkFailureKind::NoRouteToHost
        );

        let timed_out = wrap("connect", io::Error::from(io::ErrorKind::TimedOut));
        assert_eq!(
            categorize_error_chain(&timed_out),
            NetworkFailureKind::Timeout
        );
    }

    #[test]
    fn test_dns_failure_from_message() {
        let err = wrap(
            "error sending request for url (http://nowhere.invalid/)",
            wrap(
                "client error (Connect)",
                wrap(
                    "dns error",
                    io::Error::other("failed to lookup address information: Name or service not known"),
                ),
            ),
        );
        assert_eq!(categorize_error_chain(&err), NetworkFailureKind::UnknownHost);
    }

    #[test]
    fn test_tls_failure_from_message() {
        let err = wrap(
            "error sending request",
            Leaf("invalid peer certificate: UnknownIssuer"),
        );
        assert_eq!(
            categorize_error_chain(&err),
            NetworkFailureKind::UntrustedCertificate
        );

        let err = wrap(
            "client error (Connect)",
            Leaf("error:0A000086:SSL routines:tls_post_process_server_certificate:certificate verify failed"),
        );
        assert_eq!(
            categorize_error_chain(&err),
            NetworkFailureKind::UntrustedCertificate
        );
    }

    #[test]
    fn test_url_in_outer_message_is_ignored() {
        let err = wrap(
            "error sending request for url (http://intranet.example/ssl-health/tls-handshake-certificate)",
            wrap("client error (SendRequest)", Leaf("connection closed before message completed")),
        );
        assert_eq!(categorize_source_chain(&err), NetworkFailureKind::Other);

        let err = wrap(
            "error sending request for url (http://dns-error.example/)",
            Leaf("connection reset"),
        );
        assert_eq!(categorize_source_chain(&err), NetworkFailureKind::Other);
    }

    #[test]
    fn test_generic_tls_words_are_not_certificate_failures() {
        let err = wrap("client error (Connect)", Leaf("tls handshake eof while reading ssl record"));
        assert_eq!(categorize_error_chain(&err), NetworkFailureKind::Other);
    }

    #[test]
    fn test_tunnel_407_from_message() {
        let err = wrap(
            "error sending request",
            wrap("client error (Connect)", Leaf("proxy authentication required")),
        );
        assert_eq!(
            categorize_error_chain(&err),
            NetworkFailureKind::ProxyAuthenticationRequired
        );
    }

    #[test]
    fn test_unrecognized_error_is_other() {
        let err = wrap("error decoding response body", Leaf("unexpected EOF"));
        assert_eq!(categorize_error_chain(&err), NetworkFailureKind::Other);
    }

    #[test]
    fn test_overall_timeout_failure() {
        let failure = NetworkFailure::timed_out(Duration::from_millis(1500));
        assert_eq!(failure.kind, NetworkFailureKind::Timeout);
        assert_eq!(
            failure.to_string(),
            "request timed out: no complete response within 1500 ms"
        );
    }

    #[test]
    fn test_error_chain_message_skips_repeats() {
        let err = wrap("outer: inner", Leaf("inner"));
        assert_eq!(error_chain_message(&err), "outer: inner");

        let err = wrap("outer", Leaf("inner"));
        assert_eq!(error_chain_message(&err), "outer: inner");
    }
}
