//! HTTP client initialization.
//!
//! One client is built per probe run from the validated `ProbeConfig`. It
//! owns the connection pool for that run; dropping the `ProbeClient` closes
//! every pooled connection.

use std::time::Duration;

use log::{debug, info};
use reqwest::{redirect::Policy, ClientBuilder, Proxy};
use url::Url;

use crate::config::{Credentials, ProbeConfig, DEFAULT_USER_AGENT, MAX_REDIRECT_HOPS};
use crate::error_handling::InitializationError;

/// The HTTP client of a single probe run.
///
/// Besides the reqwest client it carries the target credentials and the
/// host:port they are scoped to, which the challenge handling in `fetch`
/// consults before answering a 401.
pub struct ProbeClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
    auth_host: String,
    auth_port: Option<u16>,
    timeout: Duration,
}

impl ProbeClient {
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Bound on one whole exchange: every authentication leg plus the body.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the credentials may be sent to `url`.
    pub fn in_auth_scope(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.auth_host))
            && url.port_or_known_default() == self.auth_port
    }
}

impl Drop for ProbeClient {
    fn drop(&mut self) {
        debug!(
            "Releasing HTTP client connections for {}",
            self.auth_host
        );
    }
}

/// Builds the HTTP client for one probe run.
///
/// Creates a `reqwest::Client` configured with:
/// - the probe timeout on each request it sends (the exchange as a whole is
///   bounded by `fetch::execute`)
/// - redirect following (up to `MAX_REDIRECT_HOPS`)
/// - all traffic through the configured proxy, or no proxy at all (proxy
///   environment variables are ignored)
/// - certificate and host name checks disabled when `ignore_server_cert` is set
///
/// No network I/O happens here.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the proxy address or the
/// TLS backend cannot be set up.
pub fn build_client(config: &ProbeConfig) -> Result<ProbeClient, InitializationError> {
    let mut builder = ClientBuilder::new()
        .timeout(config.timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(Policy::limited(MAX_REDIRECT_HOPS));

    if config.ignore_server_cert {
        info!("SSL Certificate validation is ignored");
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    builder = match &config.proxy {
        Some(proxy) => {
            let mut reqwest_proxy = Proxy::all(proxy.url())?;
            if let Some(creds) = &proxy.credentials {
                debug!("Proxy authentication username: {}", creds.username);
                reqwest_proxy = reqwest_proxy.basic_auth(&creds.username, &creds.password);
            }
            builder.proxy(reqwest_proxy)
        }
        None => builder.no_proxy(),
    };

    let http = builder.build()?;

    Ok(ProbeClient {
        http,
        credentials: config.credentials.clone(),
        auth_host: config.url.host_str().unwrap_or_default().to_string(),
        auth_port: config.url.port_or_known_default(),
        timeout: config.timeout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeSettings;

    fn config(url: &str) -> ProbeConfig {
        ProbeSettings {
            url: url.to_string(),
            username: Some("jdoe".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        }
        .into_config()
        .unwrap()
    }

    #[test]
    fn test_auth_scope_is_host_and_port() {
        let client = build_client(&config("http://Intranet.Example:8080/app")).unwrap();
        assert!(client.in_auth_scope(&Url::parse("http://intranet.example:8080/other").unwrap()));
        assert!(!client.in_auth_scope(&Url::parse("http://intranet.example/app").unwrap()));
        assert!(!client.in_auth_scope(&Url::parse("http://evil.example:8080/app").unwrap()));
    }

    #[test]
    fn test_default_ports_are_compared() {
        let client = build_client(&config("https://intranet.example/")).unwrap();
        assert!(client.in_auth_scope(&Url::parse("https://intranet.example:443/x").unwrap()));
        assert!(!client.in_auth_scope(&Url::parse("http://intranet.example/x").unwrap()));
    }

    #[test]
    fn test_build_with_proxy_and_insecure_tls() {
        let mut settings = ProbeSettings {
            url: "https://intranet.example/".to_string(),
            ignore_server_cert: true,
            proxy_host: Some("proxy.local".to_string()),
            proxy_username: Some("puser".to_string()),
            proxy_password: Some("ppass".to_string()),
            ..Default::default()
        };
        settings.proxy_port = 3128;
        let client = build_client(&settings.into_config().unwrap()).unwrap();
        assert!(client.credentials().is_none());
        assert_eq!(client.timeout(), Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS));
    }
}
