use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::ServiceError;
use crate::platform::PlatformError;
use crate::transport::TransportError;

/// Closed taxonomy of ceremony failure kinds.
///
/// Stable: new platform signals must degrade to [`FailureKind::Unknown`]
/// rather than extend this set ad hoc, so the UI layer can map every kind to
/// a localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The credential capability is unsupported by this platform
    NotSupported,
    /// The user declined, or the operation was not permitted
    UserCancelledOrDenied,
    /// The authenticator is already registered for this account
    DuplicateCredential,
    /// The available authenticator does not satisfy the selection criteria
    DeviceConstraintUnmet,
    /// The context is not a secure/trusted origin
    InsecureContext,
    /// The ceremony was aborted, by timeout or explicitly
    Aborted,
    /// The identity service rejected the ceremony; message passed through verbatim
    BackendRejected,
    /// Another ceremony is already in flight on this coordinator
    CeremonyAlreadyInProgress,
    /// Anything unrecognized
    Unknown,
}

/// Internal error raised by a coordinator step before classification.
///
/// Never crosses the coordinator boundary; every variant is classified into
/// a `Failure { kind, message }` outcome.
#[derive(Debug, Error)]
pub(crate) enum CeremonyError {
    #[error("{0}")]
    Platform(#[from] PlatformError),

    /// The platform resolved without producing a credential, including
    /// explicit cancellation
    #[error("No credential was produced by the authenticator")]
    NoCredential,

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The identity service answered with a shape the ceremony cannot use
    #[error("Malformed ceremony response: {0}")]
    MalformedResponse(String),

    /// A correlation token is already outstanding on this coordinator
    #[error("Another ceremony is already in progress")]
    AlreadyInProgress,

    /// The correlation token disappeared while the ceremony was in flight
    #[error("Correlation token missing for in-flight ceremony")]
    MissingCorrelation,

    /// The authenticator returned the wrong payload kind for this ceremony
    #[error("Unexpected credential payload for this ceremony")]
    UnexpectedPayload,
}
