//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults and result codes)
//! - CLI option types and lenient option parsing
//! - The validated `ProbeConfig` and the settings it is built from

mod cli;
mod constants;
mod types;

// Re-export public API
pub use cli::{
    parse_proxy_port, parse_timeout, parse_yes_flag, Command, ElementArgs, Opt, PostTextArgs,
    TargetArgs, TextArgs, TitleArgs,
};
pub use constants::*;
pub use types::{
    validate_target_url, Credentials, LogFormat, LogLevel, ProbeConfig, ProbeSettings,
    ProxyConfig, ProxyCredentials,
};
