//! Mapping observations to result codes.
//!
//! Three observations can end a probe run: a network failure (no response),
//! a response status, and, for 2xx responses, the content assertion. Each
//! has its own exhaustive mapping here.

use reqwest::StatusCode;

use super::outcome::ResultCode;
use crate::error_handling::NetworkFailureKind;
use crate::fetch::RequestMethod;

/// What to do with a received status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTriage {
    /// The status decides the result; the body is not needed.
    Final(ResultCode),
    /// 2xx: the content assertion decides.
    CheckContent,
}

/// Status rules, applied in order: 401, 407, 2xx, anything else.
pub fn triage_status(status: StatusCode) -> StatusTriage {
    match status.as_u16() {
        401 => StatusTriage::Final(ResultCode::WrongCredentials),
        407 => StatusTriage::Final(ResultCode::WrongProxyCredentials),
        200..=299 => StatusTriage::CheckContent,
        other => StatusTriage::Final(ResultCode::HttpStatus(other)),
    }
}

/// Maps a failure with no response received.
///
/// With a proxy configured the client only ever connects to (and resolves)
/// the proxy, so connection-level failures are blamed on it.
pub fn classify_network_failure(kind: NetworkFailureKind, uses_proxy: bool) -> ResultCode {
    match (kind, uses_proxy) {
        (NetworkFailureKind::Timeout, _) => ResultCode::Timeout,
        (NetworkFailureKind::UnknownHost, true) => ResultCode::ProxyServerNotAvailable,
        (NetworkFailureKind::UnknownHost, false) => ResultCode::ServerNotAvailable,
        (NetworkFailureKind::NoRouteToHost, true) => ResultCode::ProxyServerNotAvailable,
        (NetworkFailureKind::NoRouteToHost, false) => ResultCode::Exception,
        (NetworkFailureKind::UntrustedCertificate, _) => ResultCode::ServerCertificateFailed,
        (NetworkFailureKind::ConnectionRefused, true) => ResultCode::ProxyServerNotAvailable,
        (NetworkFailureKind::ConnectionRefused, false) => ResultCode::ServerNotAvailable,
        (NetworkFailureKind::ProxyAuthenticationRequired, _) => ResultCode::WrongProxyCredentials,
        (NetworkFailureKind::InvalidUrl, _) | (NetworkFailureKind::Other, _) => {
            ResultCode::Exception
        }
    }
}

/// Maps the assertion outcome of a 2xx response.
pub fn classify_assertion(matched: bool, method: RequestMethod) -> ResultCode {
    match (matched, method) {
        (true, _) => ResultCode::Ok,
        (false, RequestMethod::Get) => ResultCode::NotFound,
        (false, RequestMethod::Post) => ResultCode::TextNotFoundAfterSubmit,
    }
}
