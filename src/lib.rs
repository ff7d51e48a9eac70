//! web_smoke library: single-request web smoke probes
//!
//! Each probe sends one HTTP request to a target URL and classifies what
//! happened (network failure, HTTP status, content assertion) into a small
//! set of integer result codes that automation and runbook platforms can act
//! on.
//!
//! # Example
//!
//! ```no_run
//! use web_smoke::config::ProbeSettings;
//! use web_smoke::probe::{run_probe, Assertion, Probe};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeSettings {
//!     url: "https://intranet.example/status".to_string(),
//!     ..Default::default()
//! }
//! .into_config()?;
//! let probe = Probe::get(Assertion::text("all systems operational", false)?);
//!
//! let outcome = run_probe(&config, &probe).await;
//! println!("{} -> {}", config.url, outcome.result);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Probes are async and need a Tokio runtime; a current-thread runtime is
//! enough since a run makes a single request.

pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod parse;
pub mod probe;

// Re-export public API
pub use config::{LogFormat, LogLevel, Opt, ProbeConfig, ProbeSettings};
pub use probe::{run_command, run_probe, Assertion, Probe, ProbeOutcome, ResultCode};
