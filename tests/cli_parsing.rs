//! Tests for CLI sub-command parsing and option validation.

use std::time::Duration;

use clap::Parser;
use httptest::{matchers::*, responders::*, Expectation, Server};

use web_smoke::config::{Command, LogFormat, LogLevel, Opt, DEFAULT_PROXY_PORT, DEFAULT_TIMEOUT_MS};
use web_smoke::probe::{prepare, run_command, Assertion, ResultCode};

fn parse(args: &[&str]) -> Opt {
    let mut full = vec!["web_smoke"];
    full.extend_from_slice(args);
    Opt::try_parse_from(full).expect("arguments should parse")
}

#[test]
fn test_get_site_defaults() {
    let opt = parse(&["get-site", "--url", "https://example.test/"]);
    assert!(matches!(opt.log_level, LogLevel::Info));
    assert!(matches!(opt.log_format, LogFormat::Plain));

    let settings = opt.command.target().to_settings();
    assert_eq!(settings.url, "https://example.test/");
    assert_eq!(settings.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    assert_eq!(settings.proxy_port, DEFAULT_PROXY_PORT);
    assert!(!settings.ignore_server_cert);
    assert!(settings.username.is_none());
}

#[test]
fn test_camel_case_aliases() {
    let opt = parse(&[
        "post-text",
        "--url",
        "http://example.test/form",
        "--keyvalue",
        "Name=Jonathan Doe, Age=23",
        "--expectedText",
        "Thank you",
        "--proxyHost",
        "proxy.corp",
        "--proxyPort",
        "3128",
        "--proxyUsername",
        "puser",
        "--proxyPassword",
        "ppass",
        "--ignoreServerCert",
        "yes",
    ]);

    let Command::PostText(args) = &opt.command else {
        panic!("expected post-text, got {:?}", opt.command);
    };
    assert_eq!(args.key_values, "Name=Jonathan Doe, Age=23");
    assert_eq!(args.expected_text, "Thank you");

    let settings = args.target.to_settings();
    assert_eq!(settings.proxy_host.as_deref(), Some("proxy.corp"));
    assert_eq!(settings.proxy_port, 3128);
    assert_eq!(settings.proxy_username.as_deref(), Some("puser"));
    assert!(settings.ignore_server_cert);
}

#[test]
fn test_lenient_values_fall_back() {
    let opt = parse(&[
        "get-site",
        "--url",
        "http://example.test/",
        "--timeout",
        "soon",
        "--proxy-host",
        "proxy.corp",
        "--proxy-port",
        "http",
        "--ignore-server-cert",
        "maybe",
    ]);
    let settings = opt.command.target().to_settings();
    assert_eq!(settings.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    assert_eq!(settings.proxy_port, DEFAULT_PROXY_PORT);
    assert!(!settings.ignore_server_cert);
}

#[test]
fn test_short_flags_and_global_logging_options() {
    let opt = parse(&[
        "get-text",
        "--url",
        "http://example.test/",
        "-u",
        "CORP\\jdoe",
        "-p",
        "secret",
        "-t",
        "2500",
        "-e",
        "welcome",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ]);
    assert!(matches!(opt.log_level, LogLevel::Debug));
    assert!(matches!(opt.log_format, LogFormat::Json));

    let config = opt
        .command
        .target()
        .to_settings()
        .into_config()
        .expect("valid config");
    assert_eq!(config.timeout, Duration::from_millis(2500));
    let credentials = config.credentials.expect("credentials");
    assert_eq!(credentials.principal(), "CORP\\jdoe");
}

#[test]
fn test_missing_required_options_are_rejected() {
    assert!(Opt::try_parse_from(["web_smoke", "get-text", "--url", "http://example.test/"]).is_err());
    assert!(Opt::try_parse_from(["web_smoke", "get-title", "--title", "Home"]).is_err());
    assert!(Opt::try_parse_from(["web_smoke", "fetch-everything"]).is_err());
}

#[test]
fn test_prepare_selects_assertion() {
    let opt = parse(&[
        "get-title",
        "--url",
        "http://example.test/",
        "--title",
        "Home.*",
        "--regex",
        "yes",
    ]);
    let (_, probe) = prepare(&opt.command).expect("valid command");
    assert!(matches!(probe.assertion, Assertion::TitleMatch(_)));

    let opt = parse(&["get-site", "--url", "http://example.test/"]);
    let (_, probe) = prepare(&opt.command).expect("valid command");
    assert!(matches!(probe.assertion, Assertion::StatusOnly));
}

#[test]
fn test_prepare_rejects_bad_input() {
    let bad_url = parse(&["get-site", "--url", "ftp://example.test/"]);
    assert!(prepare(&bad_url.command).is_err());

    let bad_xpath = parse(&[
        "get-element",
        "--url",
        "http://example.test/",
        "--expected-element",
        "//div[",
    ]);
    assert!(prepare(&bad_xpath.command).is_err());

    let proxy_user_without_host = parse(&[
        "get-site",
        "--url",
        "http://example.test/",
        "--proxy-username",
        "puser",
    ]);
    assert!(prepare(&proxy_user_without_host.command).is_err());
}

#[tokio::test]
async fn test_invalid_regex_fails_before_any_request() {
    let server = Server::run();
    server.expect(
        Expectation::matching(any())
            .times(0)
            .respond_with(status_code(200)),
    );

    let url = format!("http://{}/", server.addr());
    let opt = parse(&["get-text", "--url", &url, "-e", "([unclosed", "--regex", "yes"]);
    let outcome = run_command(&opt.command).await;
    assert_eq!(outcome.result, ResultCode::Exception);
    assert!(outcome.message.is_some());
}

#[tokio::test]
async fn test_run_command_end_to_end() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/status"))
            .respond_with(status_code(200).body("<html><body>All systems operational</body></html>")),
    );

    let url = format!("http://{}/status", server.addr());
    let opt = parse(&["get-text", "--url", &url, "-e", "systems operational"]);
    let outcome = run_command(&opt.command).await;
    assert_eq!(outcome.result, ResultCode::Ok);
    assert_eq!(outcome.exit_code(), 0);
}
