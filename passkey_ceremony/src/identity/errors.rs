use thiserror::Error;

/// Errors from the identity service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The identity service answered with an error body. The message is
    /// user-facing and passed through verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable response (network, TLS, timeout)
    #[error("Identity service unreachable: {0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("Malformed identity service response: {0}")]
    Decode(String),
}
