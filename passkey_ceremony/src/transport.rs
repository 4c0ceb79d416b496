use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use thiserror::Error;

/// Errors from transport encoding/decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The input text is not valid transport encoding
    #[error("Malformed transport encoding: {0}")]
    MalformedTransport(String),
}

/// Decodes a base64url (no padding) transport string into a byte buffer.
///
/// Exact inverse of [`encode`]. Fails with [`TransportError::MalformedTransport`]
/// if the text is not valid base64url.
pub fn decode(input: &str) -> Result<Vec<u8>, TransportError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| TransportError::MalformedTransport(format!("Failed to decode base64url: {e}")))
}

/// Encodes a byte buffer as a base64url (no padding) transport string.
///
/// Total function, no failure case.
pub fn encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}
