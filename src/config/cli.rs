//! Command-line options.
//!
//! One sub-command per probe variant. Numeric and yes/no options are taken as
//! raw strings and parsed leniently: a missing or unparsable value falls back
//! to its default and is reported at info level.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::info;

use crate::config::constants::{DEFAULT_PROXY_PORT, DEFAULT_TIMEOUT_MS};
use crate::config::types::{LogFormat, LogLevel, ProbeSettings};

/// Web smoke probes: one HTTP request, one result code.
#[derive(Debug, Parser)]
#[command(name = "web_smoke", version, about)]
pub struct Opt {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain (human-readable) or json (machine-parseable)
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// GET the URL and succeed on any 2xx status
    #[command(name = "get-site")]
    GetSite(TargetArgs),

    /// GET the URL and compare the page <title>
    #[command(name = "get-title")]
    GetTitle(TitleArgs),

    /// GET the URL and search the visible page text
    #[command(name = "get-text")]
    GetText(TextArgs),

    /// GET the URL and look for an element by XPath
    #[command(name = "get-element")]
    GetElement(ElementArgs),

    /// POST a form to the URL and search the visible text of the response
    #[command(name = "post-text")]
    PostText(PostTextArgs),
}

impl Command {
    /// Connection options shared by every sub-command.
    pub fn target(&self) -> &TargetArgs {
        match self {
            Command::GetSite(target) => target,
            Command::GetTitle(args) => &args.target,
            Command::GetText(args) => &args.target,
            Command::GetElement(args) => &args.target,
            Command::PostText(args) => &args.target,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Target URL (absolute http or https)
    #[arg(long)]
    pub url: String,

    /// User name; `DOMAIN\user` selects an NT-domain account
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    #[arg(short = 'p', long, allow_hyphen_values = true)]
    pub password: Option<String>,

    /// Request timeout in milliseconds
    #[arg(short = 't', long, value_name = "MILLIS")]
    pub timeout: Option<String>,

    /// Accept any server certificate (yes/no)
    #[arg(long, alias = "ignoreServerCert", value_name = "YES|NO")]
    pub ignore_server_cert: Option<String>,

    #[arg(long, alias = "proxyHost")]
    pub proxy_host: Option<String>,

    #[arg(long, alias = "proxyPort", value_name = "PORT")]
    pub proxy_port: Option<String>,

    #[arg(long, alias = "proxyUsername")]
    pub proxy_username: Option<String>,

    #[arg(long, alias = "proxyPassword", allow_hyphen_values = true)]
    pub proxy_password: Option<String>,
}

impl TargetArgs {
    /// Applies the lenient parsing rules and returns unvalidated settings.
    pub fn to_settings(&self) -> ProbeSettings {
        let proxy_host_set = self
            .proxy_host
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty());
        ProbeSettings {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: parse_timeout(self.timeout.as_deref()),
            ignore_server_cert: parse_yes_flag(self.ignore_server_cert.as_deref()),
            proxy_host: self.proxy_host.clone(),
            proxy_port: parse_proxy_port(self.proxy_port.as_deref(), proxy_host_set),
            proxy_username: self.proxy_username.clone(),
            proxy_password: self.proxy_password.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TitleArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Expected page title
    #[arg(short = 'l', long, alias = "tl")]
    pub title: String,

    /// Treat the expected value as a regular expression (yes/no)
    #[arg(long, alias = "re", value_name = "YES|NO")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TextArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Text expected somewhere in the page body
    #[arg(short = 'e', long, alias = "expectedText", allow_hyphen_values = true)]
    pub expected_text: String,

    /// Treat the expected value as a regular expression (yes/no)
    #[arg(long, alias = "re", value_name = "YES|NO")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ElementArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// XPath expression that must match at least one node
    #[arg(short = 'x', long, alias = "expectedElement")]
    pub expected_element: String,
}

#[derive(Debug, Clone, Args)]
pub struct PostTextArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Form fields, e.g. "Name=Jonathan Doe, Age=23"
    #[arg(short = 'k', long, alias = "keyvalue", default_value = "")]
    pub key_values: String,

    /// Text expected in the response to the submitted form
    #[arg(short = 'e', long, alias = "expectedText", allow_hyphen_values = true)]
    pub expected_text: String,

    /// Treat the expected value as a regular expression (yes/no)
    #[arg(long, alias = "re", value_name = "YES|NO")]
    pub regex: Option<String>,
}

/// Parses a timeout in milliseconds, falling back to the default.
pub fn parse_timeout(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return Duration::from_millis(DEFAULT_TIMEOUT_MS);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            info!("Invalid timeout '{raw}', using the default of {DEFAULT_TIMEOUT_MS} ms");
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        }
    }
}

/// Parses a proxy port, falling back to port 80.
///
/// The fallback is only worth reporting when a proxy host was actually given.
pub fn parse_proxy_port(raw: Option<&str>, proxy_host_set: bool) -> u16 {
    match raw.map(|r| r.trim().parse::<u16>()) {
        Some(Ok(port)) if port > 0 => port,
        _ => {
            if proxy_host_set {
                info!(
                    "Invalid proxy port '{}', using port {DEFAULT_PROXY_PORT}",
                    raw.unwrap_or("")
                );
            }
            DEFAULT_PROXY_PORT
        }
    }
}

/// `yes` or `true` (any case) is true; anything else, including absence, is false.
pub fn parse_yes_flag(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .is_some_and(|v| v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(Some("5000")), Duration::from_millis(5000));
        assert_eq!(parse_timeout(Some(" 250 ")), Duration::from_millis(250));
        assert_eq!(parse_timeout(None), Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(
            parse_timeout(Some("ten seconds")),
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        );
        assert_eq!(
            parse_timeout(Some("0")),
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        );
        assert_eq!(
            parse_timeout(Some("-5")),
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        );
    }

    #[test]
    fn test_parse_proxy_port() {
        assert_eq!(parse_proxy_port(Some("3128"), true), 3128);
        assert_eq!(parse_proxy_port(Some("abc"), true), DEFAULT_PROXY_PORT);
        assert_eq!(parse_proxy_port(None, true), DEFAULT_PROXY_PORT);
        assert_eq!(parse_proxy_port(Some("70000"), false), DEFAULT_PROXY_PORT);
    }

    #[test]
    fn test_parse_yes_flag() {
        assert!(parse_yes_flag(Some("yes")));
        assert!(parse_yes_flag(Some("YES")));
        assert!(parse_yes_flag(Some("True")));
        assert!(!parse_yes_flag(Some("no")));
        assert!(!parse_yes_flag(Some("1")));
        assert!(!parse_yes_flag(Some("")));
        assert!(!parse_yes_flag(None));
    }

    #[test]
    fn test_command_target_is_shared() {
        let opt = Opt::try_parse_from([
            "web_smoke",
            "get-element",
            "--url",
            "http://example.test/",
            "--expected-element",
            "//div",
            "--timeout",
            "1500",
        ])
        .unwrap();
        let target = opt.command.target();
        assert_eq!(target.url, "http://example.test/");
        assert_eq!(
            target.to_settings().timeout,
            Duration::from_millis(1500)
        );
    }
}
