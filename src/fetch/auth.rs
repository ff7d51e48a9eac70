//! Answering `WWW-Authenticate` challenges.
//!
//! Credentials are never sent preemptively. When the target answers 401,
//! the challenges it offers are parsed and the strongest scheme we can
//! answer is chosen: NTLM, then Digest (MD5 / MD5-sess, `qop=auth` or
//! legacy), then Basic. Negotiate and Kerberos are not answered, so such a
//! 401 stands.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};

use super::ntlm;
use crate::config::Credentials;

/// One challenge from a `WWW-Authenticate` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Lowercased scheme name (`basic`, `digest`, `ntlm`, ...).
    pub scheme: String,
    /// Lowercased parameter names mapped to unquoted values.
    pub params: HashMap<String, String>,
    /// A token68 value such as an NTLM or Negotiate blob.
    pub token: Option<String>,
}

impl Challenge {
    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Credentials prepared for a re-sent request.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    Basic { username: String, password: String },
    /// A complete `Authorization: Digest ...` header value.
    Digest(String),
    /// Opens an NTLM handshake; the AUTHENTICATE leg is built from the
    /// server's reply.
    Ntlm,
}

impl Authorization {
    pub fn scheme_name(&self) -> &'static str {
        match self {
            Authorization::Basic { .. } => "Basic",
            Authorization::Digest(_) => "Digest",
            Authorization::Ntlm => "NTLM",
        }
    }

    /// The `Authorization` header value for the re-sent request.
    pub fn header_value(&self) -> String {
        match self {
            Authorization::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Authorization::Digest(value) => value.clone(),
            Authorization::Ntlm => ntlm::header_value(&ntlm::negotiate_message()),
        }
    }
}

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Authorization({})", self.scheme_name())
    }
}

/// Splits a header value into challenges.
///
/// A header may carry several challenges separated by commas, which also
/// separate the parameters of a single challenge; an element that starts
/// with a bare token followed by a space opens a new challenge.
pub fn parse_challenges(header: &str) -> Vec<Challenge> {
    let mut challenges: Vec<Challenge> = Vec::new();
    for element in split_outside_quotes(header) {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }
        let first_word_end = element.find(char::is_whitespace).unwrap_or(element.len());
        let first_word = &element[..first_word_end];
        let param_text = if first_word.contains('=') {
            element
        } else {
            challenges.push(Challenge {
                scheme: first_word.to_ascii_lowercase(),
                params: HashMap::new(),
                token: None,
            });
            element[first_word_end..].trim()
        };
        if param_text.is_empty() {
            continue;
        }
        let Some(current) = challenges.last_mut() else {
            // parameter before any scheme
            continue;
        };
        if is_token68(param_text) {
            current.token = Some(param_text.to_string());
            continue;
        }
        let Some((name, value)) = param_text.split_once('=') else {
            continue;
        };
        current
            .params
            .insert(name.trim().to_ascii_lowercase(), unquote(value.trim()));
    }
    challenges
}

/// `1*( ALPHA / DIGIT / "-" / "." / "_" / "~" / "+" / "/" ) *"="`
fn is_token68(text: &str) -> bool {
    let body = text.trim_end_matches('=');
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._~+/".contains(c))
}

fn split_outside_quotes(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => value.to_string(),
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Picks the strongest answerable challenge and prepares its credentials.
///
/// `method` and `uri` (the request target, path plus query) enter the Digest
/// hash. Returns `None` when no offered scheme can be answered.
pub fn select_authorization(
    challenges: &[Challenge],
    credentials: &Credentials,
    method: &str,
    uri: &str,
) -> Option<Authorization> {
    if challenges.iter().any(|c| c.scheme == "ntlm") {
        return Some(Authorization::Ntlm);
    }

    let digest = challenges.iter().find_map(|challenge| {
        (challenge.scheme == "digest")
            .then(|| DigestChallenge::from_challenge(challenge))
            .flatten()
    });
    if let Some(digest) = digest {
        let cnonce = format!("{:016x}", rand::random::<u64>());
        return Some(Authorization::Digest(
            digest.authorization(credentials, method, uri, &cnonce),
        ));
    }

    if challenges.iter().any(|c| c.scheme == "basic") {
        return Some(Authorization::Basic {
            username: credentials.principal(),
            password: credentials.password().to_string(),
        });
    }

    let offered: Vec<&str> = challenges.iter().map(|c| c.scheme.as_str()).collect();
    log::warn!(
        "Server requested authentication with unsupported scheme(s): {}",
        if offered.is_empty() {
            "none".to_string()
        } else {
            offered.join(", ")
        }
    );
    None
}

/// The parts of a Digest challenge needed to compute a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    /// `MD5-sess` rather than plain `MD5`.
    pub session: bool,
    /// Server offered `qop=auth`; otherwise the legacy RFC 2069 form is used.
    pub qop_auth: bool,
}

impl DigestChallenge {
    /// Returns `None` for algorithms other than MD5/MD5-sess, for challenges
    /// that only offer `qop=auth-int`, and when realm or nonce is missing.
    pub fn from_challenge(challenge: &Challenge) -> Option<Self> {
        let session = match challenge.param("algorithm") {
            None => false,
            Some(alg) if alg.eq_ignore_ascii_case("md5") => false,
            Some(alg) if alg.eq_ignore_ascii_case("md5-sess") => true,
            Some(alg) => {
                log::debug!("Skipping Digest challenge with algorithm {alg}");
                return None;
            }
        };
        let qop_auth = match challenge.param("qop") {
            None => false,
            Some(qop) if qop.split(',').any(|q| q.trim().eq_ignore_ascii_case("auth")) => true,
            Some(qop) => {
                log::debug!("Skipping Digest challenge with qop {qop}");
                return None;
            }
        };
        Some(DigestChallenge {
            realm: challenge.param("realm")?.to_string(),
            nonce: challenge.param("nonce")?.to_string(),
            opaque: challenge.param("opaque").map(str::to_string),
            session,
            qop_auth,
        })
    }

    /// Computes the `Authorization` header value for the first use of this nonce.
    pub fn authorization(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        const NONCE_COUNT: &str = "00000001";

        let username = credentials.principal();
        let mut ha1 = md5_hex(&format!(
            "{}:{}:{}",
            username,
            self.realm,
            credentials.password()
        ));
        if self.session {
            ha1 = md5_hex(&format!("{}:{}:{}", ha1, self.nonce, cnonce));
        }
        let ha2 = md5_hex(&format!("{method}:{uri}"));
        let response = if self.qop_auth {
            md5_hex(&format!(
                "{}:{}:{}:{}:auth:{}",
                ha1, self.nonce, NONCE_COUNT, cnonce, ha2
            ))
        } else {
            md5_hex(&format!("{}:{}:{}", ha1, self.nonce, ha2))
        };

        let mut header = format!(
            "Digest username={}, realm={}, nonce={}, uri={}, algorithm={}, response={}",
            quote(&username),
            quote(&self.realm),
            quote(&self.nonce),
            quote(uri),
            if self.session { "MD5-sess" } else { "MD5" },
            quote(&response),
        );
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque={}", quote(opaque)));
        }
        if self.qop_auth {
            header.push_str(&format!(
                ", qop=auth, nc={NONCE_COUNT}, cnonce={}",
                quote(cnonce)
            ));
        }
        header
    }
}

fn md5_hex(input: &str) -> String {
    Md5::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
