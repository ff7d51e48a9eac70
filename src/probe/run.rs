//! The lifecycle of one probe run.
//!
//! `Configured -> ClientBuilt -> RequestSent -> ResponseReceived ->
//! StatusTriaged -> [ContentFetched -> AssertionEvaluated]`, or
//! `RequestSent -> NetworkFailed`. Every path ends in exactly one
//! `ProbeOutcome`, and the HTTP client is dropped before it is returned.

use log::{debug, error, info, warn};

use super::assertion::{Assertion, Probe};
use super::classify::{classify_assertion, classify_network_failure, triage_status, StatusTriage};
use super::outcome::{ProbeOutcome, ResultCode};
use crate::config::{parse_yes_flag, Command, ProbeConfig};
use crate::error_handling::{ConfigError, NetworkFailure};
use crate::fetch::{execute, parse_key_values};
use crate::initialization::build_client;

/// Runs a probe described on the command line.
///
/// Options and patterns are validated first; a configuration error ends the
/// run with `ResultCode::Exception` before any network activity.
pub async fn run_command(command: &Command) -> ProbeOutcome {
    match prepare(command) {
        Ok((config, probe)) => run_probe(&config, &probe).await,
        Err(e) => {
            error!("{e}");
            ProbeOutcome::with_message(ResultCode::Exception, e.to_string())
        }
    }
}

/// Validates the options of `command` and compiles its assertion.
pub fn prepare(command: &Command) -> Result<(ProbeConfig, Probe), ConfigError> {
    let config = command.target().to_settings().into_config()?;
    let probe = match command {
        Command::GetSite(_) => Probe::get(Assertion::StatusOnly),
        Command::GetTitle(args) => Probe::get(Assertion::title(
            &args.title,
            parse_yes_flag(args.regex.as_deref()),
        )?),
        Command::GetText(args) => Probe::get(Assertion::text(
            &args.expected_text,
            parse_yes_flag(args.regex.as_deref()),
        )?),
        Command::GetElement(args) => Probe::get(Assertion::element(&args.expected_element)?),
        Command::PostText(args) => Probe::post_form(
            parse_key_values(&args.key_values),
            Assertion::text(&args.expected_text, parse_yes_flag(args.regex.as_deref()))?,
        ),
    };
    Ok((config, probe))
}

/// Runs one probe: one request exchange, one outcome.
pub async fn run_probe(config: &ProbeConfig, probe: &Probe) -> ProbeOutcome {
    let outcome = probe_once(config, probe).await;
    match &outcome.message {
        Some(message) => info!("Result: {} - {}", outcome.result, message),
        None => info!("Result: {}", outcome.result),
    }
    outcome
}

async fn probe_once(config: &ProbeConfig, probe: &Probe) -> ProbeOutcome {
    info!(
        "Making the {} request to {}",
        probe.method.as_str(),
        config.url
    );
    if let Some(credentials) = &config.credentials {
        info!("Authentication username: {}", credentials.principal());
    }
    if let Some(proxy) = &config.proxy {
        info!("Use proxy server: {}:{}", proxy.host, proxy.port);
    }

    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            error!("{e}");
            return ProbeOutcome::with_message(ResultCode::Exception, e.to_string());
        }
    };

    let request = probe.request_for(&config.url);
    let observation = match execute(&client, &request).await {
        Ok(observation) => observation,
        Err(failure) => return network_failure_outcome(&failure, config),
    };

    info!("Received status code {}", observation.status.as_u16());
    if observation.final_url != config.url {
        debug!("Final URL after redirects: {}", observation.final_url);
    }

    if let StatusTriage::Final(result) = triage_status(observation.status) {
        return ProbeOutcome::new(result);
    }
    if !probe.assertion.needs_body() {
        return ProbeOutcome::new(ResultCode::Ok);
    }

    let body = match observation.text().await {
        Ok(body) => body,
        Err(failure) => return network_failure_outcome(&failure, config),
    };
    debug!("Read {} bytes of response body", body.len());

    match probe.assertion.evaluate(&body) {
        Ok(matched) => {
            info!(
                "Expected content {}",
                if matched { "found" } else { "not found" }
            );
            ProbeOutcome::new(classify_assertion(matched, probe.method))
        }
        Err(e) => {
            error!("{e}");
            ProbeOutcome::with_message(ResultCode::Exception, e.to_string())
        }
    }
}

fn network_failure_outcome(failure: &NetworkFailure, config: &ProbeConfig) -> ProbeOutcome {
    let result = classify_network_failure(failure.kind, config.uses_proxy());
    debug!("Request failure detail: {}", failure.message);
    if result == ResultCode::Exception {
        warn!("Request to {} failed: {}", config.url, failure);
        ProbeOutcome::with_message(result, failure.to_string())
    } else {
        warn!("Request to {} failed: {}", config.url, failure.kind);
        ProbeOutcome::with_message(result, failure.kind.as_str())
    }
}
