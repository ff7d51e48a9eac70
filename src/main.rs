//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `web_smoke` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Mapping the probe outcome to the process exit status
//!
//! All probe functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::process;

use web_smoke::config::{Opt, GENERIC_FAILURE_CODE};
use web_smoke::initialization::init_logger_with;
use web_smoke::run_command;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // clap exits with 2 on usage errors, which would read as SERVER_NOT_AVAILABLE
    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => GENERIC_FAILURE_CODE,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(e) = init_logging(&opt) {
        eprintln!("web_smoke error: {:#}", e);
        process::exit(GENERIC_FAILURE_CODE);
    }

    let outcome = run_command(&opt.command).await;
    process::exit(outcome.exit_code());
}

fn init_logging(opt: &Opt) -> Result<()> {
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")
}
