//! Configuration types.
//!
//! `ProbeSettings` is the loosely-typed form filled in by the CLI layer (or
//! directly by library users); `ProbeSettings::into_config` validates it once
//! and produces the read-only `ProbeConfig` used for the rest of a probe run.

use std::time::Duration;

use clap::ValueEnum;
use url::Url;

use crate::config::constants::{DEFAULT_PROXY_PORT, DEFAULT_TIMEOUT_MS};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace (includes failure source chains)
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for log shippers
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Credentials presented to the target server.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Plain user name, offered to whichever scheme the server challenges with.
    Standard { username: String, password: String },
    /// `DOMAIN\user` style account.
    NtDomain {
        domain: String,
        username: String,
        password: String,
    },
}

impl Credentials {
    /// Builds credentials from a raw user name, or `None` when it is empty.
    ///
    /// A user name with exactly one backslash and text on both sides selects
    /// the NT-domain form.
    pub fn new(username: &str, password: &str) -> Option<Self> {
        if username.is_empty() {
            return None;
        }
        let password = password.to_string();
        match username.split_once('\\') {
            Some((domain, user))
                if !domain.is_empty() && !user.is_empty() && !user.contains('\\') =>
            {
                Some(Credentials::NtDomain {
                    domain: domain.to_string(),
                    username: user.to_string(),
                    password,
                })
            }
            _ => Some(Credentials::Standard {
                username: username.to_string(),
                password,
            }),
        }
    }

    /// The user name as sent on the wire (`DOMAIN\user` for NT accounts).
    pub fn principal(&self) -> String {
        match self {
            Credentials::Standard { username, .. } => username.clone(),
            Credentials::NtDomain {
                domain, username, ..
            } => format!("{domain}\\{username}"),
        }
    }

    /// The account name without any domain prefix.
    pub fn account_name(&self) -> &str {
        match self {
            Credentials::Standard { username, .. } | Credentials::NtDomain { username, .. } => {
                username
            }
        }
    }

    /// The NT domain, empty for plain credentials.
    pub fn domain(&self) -> &str {
        match self {
            Credentials::Standard { .. } => "",
            Credentials::NtDomain { domain, .. } => domain,
        }
    }

    pub fn password(&self) -> &str {
        match self {
            Credentials::Standard { password, .. } | Credentials::NtDomain { password, .. } => {
                password
            }
        }
    }
}

// Passwords must never reach the logs, not even through `{:?}`.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal())
            .field("password", &"***")
            .finish()
    }
}

/// User name and password for an authenticating proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Forward proxy that carries all probe traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<ProxyCredentials>,
}

impl ProxyConfig {
    /// Proxy address in the form reqwest expects.
    ///
    /// IPv6 literals are bracketed, whether or not the user already did.
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Validated, read-only configuration of one probe invocation.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Absolute http(s) URL of the target.
    pub url: Url,
    pub credentials: Option<Credentials>,
    /// Bound on the whole request exchange, body included.
    pub timeout: Duration,
    /// Accept any certificate chain and host name, for this client only.
    pub ignore_server_cert: bool,
    pub proxy: Option<ProxyConfig>,
}

impl ProbeConfig {
    pub fn uses_proxy(&self) -> bool {
        self.proxy.is_some()
    }
}

/// Unvalidated probe options.
///
/// # Examples
///
/// ```
/// use web_smoke::config::ProbeSettings;
///
/// let config = ProbeSettings {
///     url: "http://example.test/".to_string(),
///     ..Default::default()
/// }
/// .into_config()
/// .unwrap();
/// assert!(!config.uses_proxy());
/// ```
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub ignore_server_cert: bool,
    pub proxy_host: Option<String>,
    pub proxy_port: u16,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: None,
            password: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            ignore_server_cert: false,
            proxy_host: None,
            proxy_port: DEFAULT_PROXY_PORT,
            proxy_username: None,
            proxy_password: None,
        }
    }
}

impl ProbeSettings {
    /// Validates the settings and freezes them into a `ProbeConfig`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidUrl` / `UnsupportedScheme` for a target that is
    ///   not an absolute http(s) URL
    /// - `ConfigError::ProxyCredentialsWithoutHost` when a proxy user name is
    ///   given without a proxy host
    pub fn into_config(self) -> Result<ProbeConfig, ConfigError> {
        let url = validate_target_url(&self.url)?;

        let credentials = self
            .username
            .as_deref()
            .and_then(|user| Credentials::new(user, self.password.as_deref().unwrap_or("")));

        let proxy_host = self.proxy_host.filter(|h| !h.trim().is_empty());
        let proxy_username = self.proxy_username.filter(|u| !u.is_empty());

        let proxy = match (proxy_host, proxy_username) {
            (None, Some(_)) => return Err(ConfigError::ProxyCredentialsWithoutHost),
            (None, None) => None,
            (Some(host), username) => Some(ProxyConfig {
                host: host.trim().to_string(),
                port: self.proxy_port,
                credentials: username.map(|username| ProxyCredentials {
                    username,
                    password: self.proxy_password.unwrap_or_default(),
                }),
            }),
        };

        let timeout = if self.timeout.is_zero() {
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        } else {
            self.timeout
        };

        Ok(ProbeConfig {
            url,
            credentials,
            timeout,
            ignore_server_cert: self.ignore_server_cert,
            proxy,
        })
    }
}

/// Parses the target URL, accepting only absolute http and https URLs.
pub fn validate_target_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(ConfigError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        }),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
