//! Error handling.
//!
//! This module provides:
//! - Error type definitions for configuration, initialization and extraction
//! - Categorization of transport failures into a closed set of kinds
//!
//! Every failure is eventually turned into a result code by
//! `probe::classify`; nothing leaves a probe run unclassified.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{
    categorize_error_chain, categorize_reqwest_error, categorize_source_chain, error_chain_message, NetworkFailure,
    NetworkFailureKind,
};
pub use types::{ConfigError, ExtractError, InitializationError};
