use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::errors::FailureKind;
use crate::registry::EnrolledCredential;

/// The service on whose behalf a ceremony is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
    pub id: String,
    pub display_name: String,
}

/// The account a registration ceremony enrolls a credential for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    /// Opaque user handle bytes, decoded from the transport form
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

/// Attestation conveyance preference for registration ceremonies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationPreference {
    None,
    Indirect,
    Direct,
}

impl AttestationPreference {
    pub(crate) fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "none" => Self::None,
            "indirect" => Self::Indirect,
            "direct" => Self::Direct,
            invalid => {
                tracing::warn!("Invalid attestation preference: {}. Using 'none'", invalid);
                Self::None
            }
        }
    }
}

/// Strength requirement for user verification and resident-key behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionRequirement {
    Required,
    Preferred,
    Discouraged,
}

impl SelectionRequirement {
    pub(crate) fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "required" => Self::Required,
            "preferred" => Self::Preferred,
            "discouraged" => Self::Discouraged,
            invalid => {
                tracing::warn!(
                    "Invalid selection requirement: {}. Using 'preferred'",
                    invalid
                );
                Self::Preferred
            }
        }
    }
}

/// Which class of authenticator the ceremony asks the platform for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
    /// No restriction, both platform and cross-platform authenticators qualify
    Any,
}

impl AuthenticatorAttachment {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value {
            None => Self::Any,
            Some(v) => match v.to_lowercase().as_str() {
                "platform" => Self::Platform,
                "cross-platform" => Self::CrossPlatform,
                invalid => {
                    tracing::warn!(
                        "Invalid authenticator attachment: {}. Using no restriction",
                        invalid
                    );
                    Self::Any
                }
            },
        }
    }
}

/// Authenticator selection criteria issued with registration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorSelection {
    pub user_verification: SelectionRequirement,
    pub resident_key: SelectionRequirement,
    pub attachment: AuthenticatorAttachment,
}

/// Reference to an already enrolled credential.
///
/// Used as an exclusion list during registration and an allow list during
/// authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDescriptor {
    pub id: Vec<u8>,
    pub transports: Vec<String>,
}

/// Decoded ceremony options issued by the identity service for one attempt.
///
/// The `challenge` is single-use and never reused across attempts. These
/// options live exactly as long as the ceremony they were issued for.
#[derive(Debug, Clone)]
pub struct CeremonyOptions {
    pub challenge: Vec<u8>,
    pub relying_party: RelyingParty,
    /// Present for registration only
    pub user: Option<UserEntity>,
    /// Ordered list of acceptable COSE signature algorithm identifiers
    pub allowed_algorithms: Vec<i32>,
    pub timeout_ms: u32,
    pub attestation: AttestationPreference,
    pub authenticator_selection: AuthenticatorSelection,
    /// Exclusion list for registration, allow list for authentication.
    /// An empty allow list means the discoverable-credential flow.
    pub credential_descriptors: Vec<CredentialDescriptor>,
}

/// Credential produced by the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResult {
    /// String handle of the credential
    pub id: String,
    pub raw_id: Vec<u8>,
    pub payload: CredentialPayload,
}

/// The ceremony-specific half of a [`CredentialResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPayload {
    Registration {
        attestation_object: Vec<u8>,
        client_data_json: Vec<u8>,
        /// Transports negotiated by the authenticator
        transports: Vec<String>,
    },
    Authentication {
        authenticator_data: Vec<u8>,
        client_data_json: Vec<u8>,
        signature: Vec<u8>,
        user_handle: Option<Vec<u8>>,
    },
}

/// Access and refresh tokens issued on a terminal success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

/// Account data returned by the identity service on a terminal success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
}

impl From<crate::identity::AccountPayload> for Account {
    fn from(payload: crate::identity::AccountPayload) -> Self {
        Self {
            id: payload.id,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email_verified: payload.email_verified,
        }
    }
}

/// Profile supplied by the caller when registration should create a brand-new
/// account. Submitted with the finish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccountProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Terminal result of one ceremony, success or failure.
///
/// This is the only contract the UI layer should depend on; no error is ever
/// raised past the coordinator boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CeremonyOutcome {
    /// Registration created a brand-new account and signed it in
    NewAccount {
        tokens: Tokens,
        account: Account,
        requires_email_verification: bool,
    },
    /// Registration added a credential to an existing account
    CredentialAdded { credential: EnrolledCredential },
    /// Authentication succeeded
    Authenticated { tokens: Tokens, account: Account },
    Failure { kind: FailureKind, message: String },
}

impl CeremonyOutcome {
    /// The failure kind, if this outcome is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Progress of a coordinator through one ceremony attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    OptionsRequested,
    AwaitingPlatform,
    Submitting,
}

/// Which ceremony a coordinator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

/// Diagnostic event emitted by a coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CeremonyEvent {
    PhaseChanged { ceremony: CeremonyKind, phase: Phase },
    Completed {
        ceremony: CeremonyKind,
        failure: Option<FailureKind>,
    },
}

/// Diagnostic sink injected into a coordinator at construction.
///
/// Replaces a process-wide log singleton so tests can assert on emitted
/// events deterministically.
pub trait CeremonyObserver: Send + Sync {
    fn on_event(&self, event: &CeremonyEvent);
}

/// Default observer that forwards ceremony events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl CeremonyObserver for TracingObserver {
    fn on_event(&self, event: &CeremonyEvent) {
        match event {
            CeremonyEvent::PhaseChanged { ceremony, phase } => {
                tracing::debug!("Ceremony {:?} entered phase {:?}", ceremony, phase)
            }
            CeremonyEvent::Completed { ceremony, failure } => match failure {
                Some(kind) => {
                    tracing::warn!("Ceremony {:?} failed: {:?}", ceremony, kind)
                }
                None => tracing::debug!("Ceremony {:?} completed", ceremony),
            },
        }
    }
}

/// Deployment policy knobs for registration ceremonies.
#[derive(Debug, Clone, Default)]
pub struct CeremonyPolicy {
    /// Permit more than one enrolled authenticator per account. When set,
    /// registration prefers cross-platform attachment and an empty exclusion
    /// list so additional devices can enroll.
    pub permit_multiple_authenticators: bool,
}

impl CeremonyPolicy {
    /// Builds the policy from environment variables.
    pub fn from_env() -> Self {
        Self {
            permit_multiple_authenticators: *crate::config::PERMIT_MULTIPLE_AUTHENTICATORS,
        }
    }
}

/// Tracks the phase of the single in-flight ceremony of one coordinator.
pub(super) struct PhaseCell {
    inner: Mutex<Phase>,
}

impl PhaseCell {
    pub(super) fn new() -> Self {
        Self {
            inner: Mutex::new(Phase::Idle),
        }
    }

    /// Moves `Idle -> OptionsRequested`. Returns false if a ceremony is
    /// already in flight, without changing the phase.
    pub(super) fn try_begin(&self) -> bool {
        let mut phase = self.lock();
        if *phase == Phase::Idle {
            *phase = Phase::OptionsRequested;
            true
        } else {
            false
        }
    }

    pub(super) fn set(&self, next: Phase) {
        *self.lock() = next;
    }

    pub(super) fn current(&self) -> Phase {
        *self.lock()
    }

    pub(super) fn reset(&self) {
        *self.lock() = Phase::Idle;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Phase> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attestation_preference_parse() {
        assert_eq!(
            AttestationPreference::parse("none"),
            AttestationPreference::None
        );
        assert_eq!(
            AttestationPreference::parse("Direct"),
            AttestationPreference::Direct
        );
        assert_eq!(
            AttestationPreference::parse("indirect"),
            AttestationPreference::Indirect
        );
        // Unknown values degrade to the least demanding preference
        assert_eq!(
            AttestationPreference::parse("enterprise"),
            AttestationPreference::None
        );
    }

    #[test]
    fn test_selection_requirement_parse() {
        assert_eq!(
            SelectionRequirement::parse("required"),
            SelectionRequirement::Required
        );
        assert_eq!(
            SelectionRequirement::parse("DISCOURAGED"),
            SelectionRequirement::Discouraged
        );
        assert_eq!(
            SelectionRequirement::parse("bogus"),
            SelectionRequirement::Preferred
        );
    }

    #[test]
    fn test_attachment_parse() {
        assert_eq!(
            AuthenticatorAttachment::parse(None),
            AuthenticatorAttachment::Any
        );
        assert_eq!(
            AuthenticatorAttachment::parse(Some("platform")),
            AuthenticatorAttachment::Platform
        );
        assert_eq!(
            AuthenticatorAttachment::parse(Some("cross-platform")),
            AuthenticatorAttachment::CrossPlatform
        );
        assert_eq!(
            AuthenticatorAttachment::parse(Some("usb")),
            AuthenticatorAttachment::Any
        );
    }

    #[test]
    fn test_phase_cell_single_flight() {
        let cell = PhaseCell::new();
        assert_eq!(cell.current(), Phase::Idle);

        assert!(cell.try_begin());
        assert_eq!(cell.current(), Phase::OptionsRequested);

        // A second begin is rejected while in flight
        assert!(!cell.try_begin());
        assert_eq!(cell.current(), Phase::OptionsRequested);

        cell.set(Phase::AwaitingPlatform);
        assert!(!cell.try_begin());

        cell.reset();
        assert!(cell.try_begin());
    }
}
