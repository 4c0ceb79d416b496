use async_trait::async_trait;
use thiserror::Error;

use crate::ceremony::{
    AttestationPreference, AuthenticatorSelection, CredentialDescriptor, CredentialResult,
    RelyingParty, SelectionRequirement, UserEntity,
};

/// Error surfaced by the platform credential capability.
///
/// `name` mirrors the DOMException-style names raised by browser credential
/// APIs (for example `NotAllowedError`); the classifier keys off it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct PlatformError {
    name: String,
    message: String,
}

impl PlatformError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Platform-facing request for a credential-creation ceremony.
#[derive(Debug, Clone)]
pub struct CredentialCreationRequest {
    pub challenge: Vec<u8>,
    pub relying_party: RelyingParty,
    pub user: UserEntity,
    /// Ordered list of acceptable COSE signature algorithm identifiers
    pub allowed_algorithms: Vec<i32>,
    /// Advisory upper bound for user interaction, passed to the platform
    pub timeout_ms: u32,
    pub attestation: AttestationPreference,
    pub authenticator_selection: AuthenticatorSelection,
    pub exclude_credentials: Vec<CredentialDescriptor>,
}

/// Platform-facing request for a credential-assertion ceremony.
#[derive(Debug, Clone)]
pub struct CredentialAssertionRequest {
    pub challenge: Vec<u8>,
    pub relying_party_id: String,
    pub timeout_ms: u32,
    pub user_verification: SelectionRequirement,
    /// Empty means the discoverable-credential flow
    pub allow_credentials: Vec<CredentialDescriptor>,
}

/// The platform authenticator capability.
///
/// Abstracts the ambient credential-ceremony API (biometric sensor, security
/// key, or platform credential manager) behind a small interface so a
/// deterministic fake can stand in during tests. Both calls suspend until the
/// user completes or cancels the interaction; only the platform or the user
/// can abort them once started. Resolving with `Ok(None)` means the platform
/// finished without producing a credential.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn create(
        &self,
        request: CredentialCreationRequest,
    ) -> Result<Option<CredentialResult>, PlatformError>;

    async fn get(
        &self,
        request: CredentialAssertionRequest,
    ) -> Result<Option<CredentialResult>, PlatformError>;
}

#[async_trait]
impl<A: Authenticator + ?Sized> Authenticator for std::sync::Arc<A> {
    async fn create(
        &self,
        request: CredentialCreationRequest,
    ) -> Result<Option<CredentialResult>, PlatformError> {
        (**self).create(request).await
    }

    async fn get(
        &self,
        request: CredentialAssertionRequest,
    ) -> Result<Option<CredentialResult>, PlatformError> {
        (**self).get(request).await
    }
}
