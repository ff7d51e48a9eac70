//! HTTP request execution.
//!
//! This module provides:
//! - The description of the single request a probe sends
//! - Execution of that request, answering an authentication challenge
//!   (Basic, Digest or a full NTLM handshake)
//! - Parsing of form fields for the POST probe
//!
//! Exactly one logical request is made per probe run. A re-send after a 401
//! challenge belongs to the same exchange and happens at most once, apart
//! from the AUTHENTICATE leg of an NTLM handshake.

mod auth;
mod executor;
mod ntlm;
mod request;

// Re-export public API
pub use auth::{parse_challenges, select_authorization, Authorization, Challenge, DigestChallenge};
pub use executor::{execute, HttpObservation};
pub use request::{parse_key_values, HttpRequestSpec, RequestMethod};
