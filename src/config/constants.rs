//! Configuration constants.
//!
//! Defaults applied when probe options are missing or unparsable, plus the
//! numeric result codes reported to the calling automation platform.

/// Request timeout used when `--timeout` is missing, zero or not a number.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Proxy port used when a proxy host is given without a usable port.
pub const DEFAULT_PROXY_PORT: u16 = 80;

/// Maximum number of 3xx hops followed for one request.
pub const MAX_REDIRECT_HOPS: usize = 10;

/// User-Agent header sent with every probe request.
pub const DEFAULT_USER_AGENT: &str = concat!("web_smoke/", env!("CARGO_PKG_VERSION"));

// Result codes
pub const RESULT_OK: i32 = 0;
pub const RESULT_TIMEOUT: i32 = 1;
pub const RESULT_SERVER_NOT_AVAILABLE: i32 = 2;
/// HTTP 401 from the target server.
pub const RESULT_WRONG_CREDENTIALS: i32 = 3;
pub const RESULT_PROXY_SERVER_NOT_AVAILABLE: i32 = 4;
/// HTTP 407 from the proxy.
pub const RESULT_WRONG_PROXY_CREDENTIALS: i32 = 5;
pub const RESULT_SERVER_CERTIFICATE_FAILED: i32 = 6;
/// Shared by the text, title and element checks.
pub const RESULT_NOT_FOUND: i32 = 7;
pub const RESULT_TEXT_NOT_FOUND_AFTER_SUBMIT: i32 = 10;

/// Code for configuration errors and failures outside the taxonomy.
///
/// Must stay distinct from the codes above and outside the 100-599 status range.
pub const GENERIC_FAILURE_CODE: i32 = 99;
