//! Ceremony coordination: state machines, failure taxonomy, correlation.

mod auth;
mod classifier;
mod correlation;
mod errors;
mod register;
mod types;

pub use auth::AuthenticationCoordinator;
pub use errors::FailureKind;
pub use register::RegistrationCoordinator;
pub use types::{
    Account, AttestationPreference, AuthenticatorAttachment, AuthenticatorSelection,
    CeremonyEvent, CeremonyKind, CeremonyObserver, CeremonyOptions, CeremonyOutcome,
    CeremonyPolicy, CredentialDescriptor, CredentialPayload, CredentialResult, NewAccountProfile,
    Phase, RelyingParty, SelectionRequirement, Tokens, TracingObserver, UserEntity,
};

use errors::CeremonyError;

use crate::identity::DescriptorPayload;
use crate::transport;

/// Decodes a wire-form descriptor list into platform-facing descriptors.
fn decode_descriptors(
    payloads: &[DescriptorPayload],
) -> Result<Vec<CredentialDescriptor>, CeremonyError> {
    payloads
        .iter()
        .map(|d| {
            Ok(CredentialDescriptor {
                id: transport::decode(&d.id)?,
                transports: d.transports.clone(),
            })
        })
        .collect()
}
