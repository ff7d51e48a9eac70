//! NTLM (NTLMv2) message construction.
//!
//! NTLM authenticates the connection rather than the request: the client
//! sends a NEGOTIATE message, the server answers 401 with a CHALLENGE, and
//! the client proves knowledge of the password in an AUTHENTICATE message,
//! all over the same keep-alive connection. Only the NTLMv2 response is
//! produced; LM and NTLMv1 are never sent.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use md4::Md4;
use md5::{Digest, Md5};

use crate::config::Credentials;

const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const NEGOTIATE_UNICODE: u32 = 0x0000_0001;
const REQUEST_TARGET: u32 = 0x0000_0004;
const NEGOTIATE_NTLM: u32 = 0x0000_0200;
const NEGOTIATE_ALWAYS_SIGN: u32 = 0x0000_8000;
const NEGOTIATE_EXTENDED_SESSIONSECURITY: u32 = 0x0008_0000;
const NEGOTIATE_128: u32 = 0x2000_0000;
const NEGOTIATE_56: u32 = 0x8000_0000;

const CLIENT_FLAGS: u32 = NEGOTIATE_UNICODE
    | REQUEST_TARGET
    | NEGOTIATE_NTLM
    | NEGOTIATE_ALWAYS_SIGN
    | NEGOTIATE_EXTENDED_SESSIONSECURITY
    | NEGOTIATE_128
    | NEGOTIATE_56;

const AV_EOL: u16 = 0;
const AV_TIMESTAMP: u16 = 7;

/// Seconds between 1601-01-01 (FILETIME epoch) and the Unix epoch, in microseconds.
const FILETIME_UNIX_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// The NEGOTIATE (type 1) message, with no domain or workstation supplied.
pub fn negotiate_message() -> Vec<u8> {
    let mut msg = Vec::with_capacity(32);
    msg.extend_from_slice(SIGNATURE);
    msg.extend_from_slice(&1u32.to_le_bytes());
    msg.extend_from_slice(&CLIENT_FLAGS.to_le_bytes());
    // empty domain and workstation buffers
    for _ in 0..2 {
        push_security_buffer(&mut msg, 0, 32);
    }
    msg
}

/// A parsed CHALLENGE (type 2) message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeMessage {
    pub server_challenge: [u8; 8],
    pub flags: u32,
    /// Raw AV_PAIR list, echoed back inside the NTLMv2 response.
    pub target_info: Vec<u8>,
}

impl ChallengeMessage {
    /// Decodes the base64 token of an `NTLM <token>` challenge.
    pub fn from_token(token: &str) -> Option<Self> {
        let bytes = STANDARD.decode(token.trim()).ok()?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 32 || &bytes[..8] != SIGNATURE || read_u32(bytes, 8)? != 2 {
            return None;
        }
        let flags = read_u32(bytes, 20)?;
        let server_challenge = bytes[24..32].try_into().ok()?;

        // Servers that predate target info stop after the reserved field
        let target_info = if bytes.len() >= 48 {
            let len = usize::from(read_u16(bytes, 40)?);
            let offset = usize::try_from(read_u32(bytes, 44)?).ok()?;
            bytes.get(offset..offset.checked_add(len)?)?.to_vec()
        } else {
            Vec::new()
        };

        Some(ChallengeMessage {
            server_challenge,
            flags,
            target_info,
        })
    }

    /// The server's `MsvAvTimestamp`, if it sent one.
    pub fn timestamp(&self) -> Option<u64> {
        let info = &self.target_info;
        let mut pos = 0;
        while pos + 4 <= info.len() {
            let id = read_u16(info, pos)?;
            let len = usize::from(read_u16(info, pos + 2)?);
            let value = info.get(pos + 4..pos + 4 + len)?;
            match id {
                AV_EOL => return None,
                AV_TIMESTAMP => return Some(u64::from_le_bytes(value.try_into().ok()?)),
                _ => pos += 4 + len,
            }
        }
        None
    }
}

/// Builds the AUTHENTICATE (type 3) message answering `challenge`.
///
/// `timestamp` is the client's FILETIME; the server's own timestamp replaces
/// it when present, and the LMv2 response is then sent empty (all zero).
/// Returns `None` only if a field does not fit the 16-bit length of an NTLM
/// security buffer.
pub fn authenticate_message(
    challenge: &ChallengeMessage,
    credentials: &Credentials,
    client_challenge: [u8; 8],
    timestamp: u64,
) -> Option<Vec<u8>> {
    let key = ntowf_v2(credentials);
    let (lm_response, timestamp) = match challenge.timestamp() {
        Some(server_time) => (vec![0u8; 24], server_time),
        None => (
            lmv2_response(&key, &challenge.server_challenge, &client_challenge),
            timestamp,
        ),
    };
    let nt_response = ntv2_response(
        &key,
        &challenge.server_challenge,
        &client_challenge,
        timestamp,
        &challenge.target_info,
    );

    let domain = utf16le(credentials.domain());
    let user = utf16le(credentials.account_name());
    let workstation: Vec<u8> = Vec::new();

    const HEADER_LEN: usize = 64;
    let fields: [&[u8]; 5] = [&domain, &user, &workstation, &lm_response, &nt_response];
    let mut offsets = [0u32; 5];
    let mut offset = HEADER_LEN;
    for (slot, field) in offsets.iter_mut().zip(fields) {
        *slot = u32::try_from(offset).ok()?;
        offset += field.len();
    }
    let end = u32::try_from(offset).ok()?;
    let [domain_at, user_at, workstation_at, lm_at, nt_at] = offsets;

    let mut msg = Vec::with_capacity(offset);
    msg.extend_from_slice(SIGNATURE);
    msg.extend_from_slice(&3u32.to_le_bytes());
    push_security_buffer(&mut msg, u16::try_from(lm_response.len()).ok()?, lm_at);
    push_security_buffer(&mut msg, u16::try_from(nt_response.len()).ok()?, nt_at);
    push_security_buffer(&mut msg, u16::try_from(domain.len()).ok()?, domain_at);
    push_security_buffer(&mut msg, u16::try_from(user.len()).ok()?, user_at);
    push_security_buffer(&mut msg, 0, workstation_at);
    // no session key
    push_security_buffer(&mut msg, 0, end);
    msg.extend_from_slice(&((challenge.flags & CLIENT_FLAGS) | NEGOTIATE_UNICODE).to_le_bytes());
    for field in fields {
        msg.extend_from_slice(field);
    }
    Some(msg)
}

/// `NTLM <base64>` as sent in an `Authorization` header.
pub fn header_value(message: &[u8]) -> String {
    format!("NTLM {}", STANDARD.encode(message))
}

/// Current time as a Windows FILETIME (100 ns ticks since 1601).
pub fn filetime_now() -> u64 {
    let micros = chrono::Utc::now().timestamp_micros() + FILETIME_UNIX_OFFSET_MICROS;
    u64::try_from(micros).unwrap_or_default() * 10
}

fn nt_hash(password: &str) -> [u8; 16] {
    Md4::digest(utf16le(password)).into()
}

fn ntowf_v2(credentials: &Credentials) -> [u8; 16] {
    let identity = format!(
        "{}{}",
        credentials.account_name().to_uppercase(),
        credentials.domain()
    );
    hmac_md5(&nt_hash(credentials.password()), &[&utf16le(&identity)])
}

fn lmv2_response(key: &[u8; 16], server_challenge: &[u8; 8], client_challenge: &[u8; 8]) -> Vec<u8> {
    let mut response = hmac_md5(key, &[server_challenge, client_challenge]).to_vec();
    response.extend_from_slice(client_challenge);
    response
}

fn ntv2_response(
    key: &[u8; 16],
    server_challenge: &[u8; 8],
    client_challenge: &[u8; 8],
    timestamp: u64,
    target_info: &[u8],
) -> Vec<u8> {
    let mut blob = Vec::with_capacity(32 + target_info.len());
    blob.extend_from_slice(&[1, 1, 0, 0, 0, 0, 0, 0]);
    blob.extend_from_slice(&timestamp.to_le_bytes());
    blob.extend_from_slice(client_challenge);
    blob.extend_from_slice(&[0; 4]);
    blob.extend_from_slice(target_info);
    blob.extend_from_slice(&[0; 4]);

    let mut response = hmac_md5(key, &[server_challenge, &blob]).to_vec();
    response.extend_from_slice(&blob);
    response
}

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> [u8; 16] {
    let mut mac = Hmac::<Md5>::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn push_security_buffer(msg: &mut Vec<u8>, len: u16, offset: u32) {
    msg.extend_from_slice(&len.to_le_bytes());
    msg.extend_from_slice(&len.to_le_bytes());
    msg.extend_from_slice(&offset.to_le_bytes());
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}
