//! Passkey ceremony orchestration for the admin dashboard.
//!
//! This crate coordinates the two credential ceremonies against a remote
//! identity service and the platform authenticator:
//!
//! - **Registration**: enroll a credential, either creating a brand-new
//!   account or adding a device to a signed-in one.
//! - **Authentication**: sign in with an enrolled credential, including the
//!   discoverable-credential flow.
//!
//! The coordinators never raise errors past their boundary; every attempt
//! ends in a [`CeremonyOutcome`]. Platform and service failures are mapped to
//! the closed [`FailureKind`] taxonomy so UI code can branch on a stable set
//! of cases.
//!
//! The platform side is abstracted behind the [`Authenticator`] trait and the
//! server side behind [`IdentityService`], so the ceremony logic is testable
//! with deterministic fakes.

mod ceremony;
mod config;
mod identity;
mod platform;
mod registry;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use ceremony::{
    Account, AttestationPreference, AuthenticationCoordinator, AuthenticatorAttachment,
    AuthenticatorSelection, CeremonyEvent, CeremonyKind, CeremonyObserver, CeremonyOptions,
    CeremonyOutcome, CeremonyPolicy, CredentialDescriptor, CredentialPayload, CredentialResult,
    FailureKind, NewAccountProfile, Phase, RegistrationCoordinator, RelyingParty,
    SelectionRequirement, Tokens, TracingObserver, UserEntity,
};
pub use identity::{
    AccountPayload, AssertionCredential, AssertionPayload, AttestationPayload,
    AuthenticationFinishRequest, AuthenticationFinishResponse, AuthenticationOptionsPayload,
    AuthenticationOptionsResponse, CredentialSummary, DescriptorPayload, HttpIdentityService,
    IdentityService, NewAccountPayload, PubKeyCredParam, RegisterCredential,
    RegistrationFinishRequest, RegistrationFinishResponse, RegistrationOptionsPayload,
    RegistrationOptionsResponse, RelyingPartyPayload, SelectionPayload, UserPayload,
    RevokeStatus, ServiceError,
};
pub use platform::{
    Authenticator, CredentialAssertionRequest, CredentialCreationRequest, PlatformError,
};
pub use registry::{CredentialRegistry, EnrolledCredential, RegistryError, RevokeOutcome};
pub use transport::TransportError;
