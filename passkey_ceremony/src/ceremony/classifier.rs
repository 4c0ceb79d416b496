//! Maps platform-level ceremony errors to the closed failure taxonomy.

use super::errors::{CeremonyError, FailureKind};
use crate::identity::ServiceError;
use crate::platform::PlatformError;

/// Classifies a ceremony error into a failure kind and a user-facing message.
///
/// Pure function: the same input always yields the same kind. Unrecognized
/// platform signals degrade to [`FailureKind::Unknown`] rather than failing.
pub(crate) fn classify(err: &CeremonyError) -> (FailureKind, String) {
    match err {
        CeremonyError::Platform(platform) => classify_platform(platform),
        CeremonyError::NoCredential => {
            (FailureKind::Aborted, message_for(FailureKind::Aborted).to_string())
        }
        // Service rejections and network failures both surface the message
        // verbatim; it is user-facing by design of this system.
        CeremonyError::Service(ServiceError::Rejected(msg)) => {
            (FailureKind::BackendRejected, msg.clone())
        }
        CeremonyError::Service(ServiceError::Transport(msg)) => {
            (FailureKind::BackendRejected, msg.clone())
        }
        CeremonyError::Service(ServiceError::Decode(msg)) => {
            (FailureKind::BackendRejected, msg.clone())
        }
        CeremonyError::Transport(e) => (FailureKind::Unknown, e.to_string()),
        CeremonyError::AlreadyInProgress => (
            FailureKind::CeremonyAlreadyInProgress,
            message_for(FailureKind::CeremonyAlreadyInProgress).to_string(),
        ),
        CeremonyError::MalformedResponse(msg) => (FailureKind::Unknown, msg.clone()),
        CeremonyError::MissingCorrelation | CeremonyError::UnexpectedPayload => {
            (FailureKind::Unknown, err.to_string())
        }
    }
}

/// Maps a platform exception by its DOMException-style name.
fn classify_platform(err: &PlatformError) -> (FailureKind, String) {
    let kind = match err.name() {
        "NotSupportedError" => FailureKind::NotSupported,
        "NotAllowedError" => FailureKind::UserCancelledOrDenied,
        "InvalidStateError" => FailureKind::DuplicateCredential,
        "ConstraintError" => FailureKind::DeviceConstraintUnmet,
        "SecurityError" => FailureKind::InsecureContext,
        "AbortError" | "TimeoutError" => FailureKind::Aborted,
        _ => FailureKind::Unknown,
    };
    (kind, message_for(kind).to_string())
}

/// Stable user-facing message template for a failure kind.
///
/// `classify` never reaches the `BackendRejected` arm, since that kind always
/// carries the server-supplied text; the arm exists to keep the match total.
pub(crate) fn message_for(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::NotSupported => "Passkeys are not supported on this device or browser",
        FailureKind::UserCancelledOrDenied => {
            "The passkey request was cancelled or not permitted"
        }
        FailureKind::DuplicateCredential => {
            "This authenticator is already registered for this account"
        }
        FailureKind::DeviceConstraintUnmet => {
            "No available authenticator satisfies the requested criteria"
        }
        FailureKind::InsecureContext => "Passkeys require a secure (HTTPS) context",
        FailureKind::Aborted => "The passkey ceremony was aborted before it could complete",
        FailureKind::BackendRejected => "The identity service rejected the ceremony",
        FailureKind::CeremonyAlreadyInProgress => "Another passkey ceremony is already in progress",
        FailureKind::Unknown => "An unexpected error occurred during the passkey ceremony",
    }
}
