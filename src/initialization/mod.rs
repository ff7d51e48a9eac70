//! Application initialization and resource setup.
//!
//! This module provides functions to initialize:
//! - the process-wide logger
//! - the per-run HTTP client
//!
//! All initialization functions return `InitializationError` on failure.

mod client;
mod logger;

// Re-export public API
pub use client::{build_client, ProbeClient};
pub use logger::init_logger_with;
