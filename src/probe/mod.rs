//! Probe variants and result classification.
//!
//! A probe is one request plus one assertion on its response:
//! - `get-site`: status only
//! - `get-title`: `<title>` equality or full regex match
//! - `get-text`: body text containment or regex search
//! - `get-element`: XPath lookup
//! - `post-text`: a submitted form, then a body text check
//!
//! The run always ends in a single `ProbeOutcome` carrying a `ResultCode`.

mod assertion;
mod classify;
mod outcome;
mod run;

// Re-export public API
pub use assertion::{Assertion, Probe, TextMatcher};
pub use classify::{classify_assertion, classify_network_failure, triage_status, StatusTriage};
pub use outcome::{ProbeOutcome, ResultCode};
pub use run::{prepare, run_command, run_probe};
