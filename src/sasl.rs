//! SASL authentication for IRC.
//!
//! A [`SaslClient`] answers server challenges with raw bytes; the session
//! takes care of base64 and of splitting the answer into `AUTHENTICATE`
//! lines with [`encode_response`].
//!
//! # Supported Mechanisms
//!
//! - **PLAIN**: Simple username/password authentication (RFC 4616)
//! - **EXTERNAL**: Certificate-based authentication (client cert)
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.2>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>
//!
//! # Example
//!
//! ```
//! use slirc_session::sasl::{encode_plain, encode_response};
//!
//! let encoded = encode_plain("myuser", "mypassword");
//! assert_eq!(encoded, "AG15dXNlcgBteXBhc3N3b3Jk");
//! assert_eq!(encode_response(b""), vec!["+"]);
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

/// Maximum length of a single SASL message chunk (400 bytes).
///
/// SASL responses that exceed this length must be split into multiple
/// AUTHENTICATE commands.
pub const SASL_CHUNK_SIZE: usize = 400;

/// Errors raised while answering a challenge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SaslError {
    /// The mechanism did not expect this challenge.
    #[error("unexpected SASL challenge")]
    UnexpectedChallenge,

    /// The server sent a challenge that is not valid base64.
    #[error("invalid base64 in SASL challenge: {0}")]
    InvalidBase64(String),
}

/// A client-side SASL mechanism.
pub trait SaslClient: Send {
    /// Mechanism name sent with the first `AUTHENTICATE`.
    fn mechanism(&self) -> &str;

    /// Answer a decoded challenge. An empty challenge asks for the initial
    /// response.
    fn respond(&mut self, challenge: &[u8]) -> Result<Vec<u8>, SaslError>;
}

/// PLAIN mechanism (RFC 4616) with an empty authorization identity.
#[derive(Clone)]
pub struct SaslPlain {
    /// Authentication identity.
    pub username: String,
    /// Password.
    pub password: String,
}

impl SaslPlain {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        SaslPlain {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SaslPlain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslPlain")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SaslClient for SaslPlain {
    fn mechanism(&self) -> &str {
        "PLAIN"
    }

    fn respond(&mut self, challenge: &[u8]) -> Result<Vec<u8>, SaslError> {
        if !challenge.is_empty() {
            return Err(SaslError::UnexpectedChallenge);
        }
        Ok(plain_payload("", &self.username, &self.password))
    }
}

/// EXTERNAL mechanism: the TLS client certificate authenticates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaslExternal;

impl SaslClient for SaslExternal {
    fn mechanism(&self) -> &str {
        "EXTERNAL"
    }

    fn respond(&mut self, challenge: &[u8]) -> Result<Vec<u8>, SaslError> {
        if !challenge.is_empty() {
            return Err(SaslError::UnexpectedChallenge);
        }
        Ok(Vec::new())
    }
}

fn plain_payload(authzid: &str, authcid: &str, password: &str) -> Vec<u8> {
    format!("{}\0{}\0{}", authzid, authcid, password).into_bytes()
}

/// Encode credentials for the PLAIN mechanism.
///
/// The PLAIN mechanism encodes: `authzid NUL authcid NUL password`, with
/// an empty `authzid`.
pub fn encode_plain(username: &str, password: &str) -> String {
    BASE64.encode(plain_payload("", username, password))
}

/// Decode an `AUTHENTICATE` payload. `+` is the empty challenge.
pub fn decode_challenge(payload: &str) -> Result<Vec<u8>, SaslError> {
    if payload == "+" {
        return Ok(Vec::new());
    }
    BASE64
        .decode(payload)
        .map_err(|e| SaslError::InvalidBase64(e.to_string()))
}

/// Encode a response into `AUTHENTICATE` payloads.
///
/// An empty response is `+`. Longer responses are split into 400-byte
/// chunks; when the last chunk is exactly 400 bytes a final `+` marks the
/// end.
pub fn encode_response(response: &[u8]) -> Vec<String> {
    let encoded = BASE64.encode(response);
    if encoded.is_empty() {
        return vec!["+".to_owned()];
    }
    let mut chunks: Vec<String> = encoded
        .as_bytes()
        .chunks(SASL_CHUNK_SIZE)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    if encoded.len() % SASL_CHUNK_SIZE == 0 {
        chunks.push("+".to_owned());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain() {
        let encoded = encode_plain("user", "pass");
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"\0user\0pass");
    }

    #[test]
    fn test_plain_client() {
        let mut client = SaslPlain::new("user", "pass");
        assert_eq!(client.mechanism(), "PLAIN");
        assert_eq!(client.respond(b"").unwrap(), b"\0user\0pass");
        assert_eq!(
            client.respond(b"more"),
            Err(SaslError::UnexpectedChallenge)
        );
        assert!(!format!("{client:?}").contains("pass\""));
    }

    #[test]
    fn test_external_client() {
        let mut client = SaslExternal;
        assert_eq!(client.mechanism(), "EXTERNAL");
        assert_eq!(encode_response(&client.respond(b"").unwrap()), vec!["+"]);
    }

    #[test]
    fn test_decode_challenge() {
        assert_eq!(decode_challenge("+").unwrap(), b"");
        assert_eq!(decode_challenge("aGVsbG8=").unwrap(), b"hello");
        assert!(matches!(
            decode_challenge("!!!"),
            Err(SaslError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_encode_response_chunking() {
        // 600 raw bytes -> 800 base64 chars: two full chunks and a terminator.
        let chunks = encode_response(&[0u8; 600]);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 400);
        assert_eq!(chunks[1].len(), 400);
        assert_eq!(chunks[2], "+");

        // 450 raw bytes -> 600 base64 chars: no terminator needed.
        let chunks = encode_response(&[0u8; 450]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].len(), 200);
    }

    #[test]
    fn test_exactly_400_bytes() {
        // 300 raw bytes -> exactly 400 base64 chars.
        let chunks = encode_response(&[1u8; 300]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 400);
        assert_eq!(chunks[1], "+");
    }
}
