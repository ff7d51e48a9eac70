//! Sending the probe request and observing the outcome.

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode};
use tokio::time::{timeout_at, Instant};
use url::Url;

use super::auth::{parse_challenges, select_authorization, Authorization, Challenge};
use super::ntlm;
use super::request::{HttpRequestSpec, RequestMethod};
use crate::config::Credentials;
use crate::error_handling::NetworkFailure;
use crate::initialization::ProbeClient;

/// A completed HTTP exchange, whatever its status.
///
/// The body is not read until [`HttpObservation::text`] is called, so a
/// status-only probe never downloads the page.
#[derive(Debug)]
pub struct HttpObservation {
    pub status: StatusCode,
    /// URL of the final response, after redirects.
    pub final_url: Url,
    response: Response,
    deadline: Instant,
    timeout: Duration,
}

impl HttpObservation {
    fn new(response: Response, deadline: Instant, timeout: Duration) -> Self {
        HttpObservation {
            status: response.status(),
            final_url: response.url().clone(),
            response,
            deadline,
            timeout,
        }
    }

    /// Reads the body as text, decoded per the response charset (UTF-8 by default).
    ///
    /// # Errors
    ///
    /// The body read shares the deadline of the exchange that produced the
    /// response; running past it, or a broken connection, is reported like
    /// any other network failure.
    pub async fn text(self) -> Result<String, NetworkFailure> {
        timeout_at(self.deadline, self.response.text())
            .await
            .map_err(|_| NetworkFailure::timed_out(self.timeout))?
            .map_err(|e| NetworkFailure::from_reqwest(&e))
    }
}

/// Executes one logical request.
///
/// A network-level failure is returned as a categorized `NetworkFailure`; a
/// completed exchange is returned as an observation regardless of status. A
/// 401 from the target is answered once, within the same exchange, when
/// credentials are configured for its host:port and the server offers a
/// scheme we support; the second response is final. NTLM adds the
/// AUTHENTICATE leg on the same connection.
///
/// Every leg and the later body read share one deadline, `client.timeout()`
/// from now.
pub async fn execute(
    client: &ProbeClient,
    request: &HttpRequestSpec,
) -> Result<HttpObservation, NetworkFailure> {
    let deadline = Instant::now() + client.timeout();
    let response = timeout_at(deadline, exchange(client, request))
        .await
        .map_err(|_| NetworkFailure::timed_out(client.timeout()))??;
    Ok(HttpObservation::new(response, deadline, client.timeout()))
}

async fn exchange(client: &ProbeClient, request: &HttpRequestSpec) -> Result<Response, NetworkFailure> {
    let response = send(client, request, &request.url, None).await?;
    if response.status() != StatusCode::UNAUTHORIZED {
        return Ok(response);
    }

    let Some(credentials) = client.credentials() else {
        debug!("Received 401 and no credentials are configured");
        return Ok(response);
    };
    if !client.in_auth_scope(response.url()) {
        warn!(
            "Not sending credentials to {}: outside the target host:port",
            response.url()
        );
        return Ok(response);
    }

    let challenged_url = response.url().clone();
    let Some(authorization) = select_authorization(
        &challenges(&response),
        credentials,
        request.method.as_str(),
        &request_target(&challenged_url),
    ) else {
        return Ok(response);
    };

    debug!(
        "Answering {} challenge from {}",
        authorization.scheme_name(),
        challenged_url
    );
    release(response).await;
    let header = authorization.header_value();
    let retried = send(client, request, &challenged_url, Some(header.as_str())).await?;
    if authorization != Authorization::Ntlm {
        return Ok(retried);
    }
    complete_ntlm(client, request, &challenged_url, credentials, retried).await
}

/// Sends the AUTHENTICATE message if the server answered NEGOTIATE with a
/// CHALLENGE; any other response ends the exchange as it is.
async fn complete_ntlm(
    client: &ProbeClient,
    request: &HttpRequestSpec,
    url: &Url,
    credentials: &Credentials,
    response: Response,
) -> Result<Response, NetworkFailure> {
    if response.status() != StatusCode::UNAUTHORIZED {
        return Ok(response);
    }

    let challenge = challenges(&response)
        .into_iter()
        .filter(|c| c.scheme == "ntlm")
        .find_map(|c| c.token.as_deref().and_then(ntlm::ChallengeMessage::from_token));
    let Some(challenge) = challenge else {
        warn!("NTLM negotiation with {url} was not answered with a challenge");
        return Ok(response);
    };
    let Some(message) = ntlm::authenticate_message(
        &challenge,
        credentials,
        rand::random(),
        ntlm::filetime_now(),
    ) else {
        warn!("NTLM credentials for {url} are too long to encode");
        return Ok(response);
    };

    debug!("Sending NTLM AUTHENTICATE to {url}");
    release(response).await;
    let header = ntlm::header_value(&message);
    send(client, request, url, Some(header.as_str())).await
}

fn challenges(response: &Response) -> Vec<Challenge> {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_challenges)
        .collect()
}

/// Reads a response to the end so its connection goes back to the pool.
async fn release(response: Response) {
    if let Err(e) = response.bytes().await {
        debug!("Discarding challenge body failed: {e}");
    }
}

async fn send(
    client: &ProbeClient,
    request: &HttpRequestSpec,
    url: &Url,
    authorization: Option<&str>,
) -> Result<Response, NetworkFailure> {
    let mut builder = match request.method {
        RequestMethod::Get => client.http().get(url.clone()),
        RequestMethod::Post => client.http().post(url.clone()).form(&request.form),
    };
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder
        .send()
        .await
        .map_err(|e| NetworkFailure::from_reqwest(&e))
}

/// Path and query of `url`, as used in the HTTP request line.
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_target() {
        let url = Url::parse("http://example.test/dir/index.html?x=1&y=2#frag").unwrap();
        assert_eq!(request_target(&url), "/dir/index.html?x=1&y=2");

        let url = Url::parse("http://example.test").unwrap();
        assert_eq!(request_target(&url), "/");
    }
}
