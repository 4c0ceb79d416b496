use std::sync::Arc;

use super::classifier::{classify, message_for};
use super::correlation::CorrelationStore;
use super::decode_descriptors;
use super::errors::{CeremonyError, FailureKind};
use super::types::{
    AttestationPreference, AuthenticatorAttachment, AuthenticatorSelection, CeremonyEvent,
    CeremonyKind, CeremonyOptions, CeremonyOutcome, CeremonyPolicy, CredentialPayload,
    CredentialResult, NewAccountProfile, Phase, PhaseCell, RelyingParty, SelectionRequirement,
    Tokens, TracingObserver, UserEntity,
};
use super::types::CeremonyObserver;
use crate::identity::{
    AttestationPayload, IdentityService, NewAccountPayload, RegisterCredential,
    RegistrationFinishRequest, RegistrationFinishResponse, RegistrationOptionsPayload,
};
use crate::platform::{Authenticator, CredentialCreationRequest};
use crate::registry::CredentialRegistry;
use crate::transport;

/// Drives the credential-creation ceremony end to end.
///
/// One instance enforces at most one in-flight ceremony; a second call while
/// one is pending is rejected synchronously, never queued. No failure escapes
/// [`RegistrationCoordinator::register`] as an error: everything comes back
/// as a [`CeremonyOutcome`].
pub struct RegistrationCoordinator<S: IdentityService, A: Authenticator> {
    service: Arc<S>,
    authenticator: A,
    registry: Arc<CredentialRegistry<S>>,
    policy: CeremonyPolicy,
    observer: Arc<dyn CeremonyObserver>,
    phase: PhaseCell,
    correlation: CorrelationStore,
}

impl<S: IdentityService, A: Authenticator> RegistrationCoordinator<S, A> {
    pub fn new(
        service: Arc<S>,
        authenticator: A,
        registry: Arc<CredentialRegistry<S>>,
        policy: CeremonyPolicy,
    ) -> Self {
        Self {
            service,
            authenticator,
            registry,
            policy,
            observer: Arc::new(TracingObserver),
            phase: PhaseCell::new(),
            correlation: CorrelationStore::new(),
        }
    }

    /// Replaces the default tracing observer with an injected diagnostic sink.
    pub fn with_observer(mut self, observer: Arc<dyn CeremonyObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Current phase of the coordinator, for UI state.
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    /// Runs one registration ceremony: options request, platform credential
    /// creation, finish submission.
    ///
    /// `new_account` carries the profile for the brand-new-account flow and
    /// is `None` when a signed-in account adds a credential. The correlation
    /// token is discarded on every exit path, success or failure.
    pub async fn register(&self, new_account: Option<NewAccountProfile>) -> CeremonyOutcome {
        if !self.phase.try_begin() {
            // The in-flight ceremony owns the correlation store; leave it alone.
            return CeremonyOutcome::Failure {
                kind: FailureKind::CeremonyAlreadyInProgress,
                message: message_for(FailureKind::CeremonyAlreadyInProgress).to_string(),
            };
        }
        self.emit_phase(Phase::OptionsRequested);

        let outcome = match self.drive(new_account).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let (kind, message) = classify(&err);
                tracing::warn!("Registration ceremony failed: {} ({:?})", message, kind);
                CeremonyOutcome::Failure { kind, message }
            }
        };

        self.correlation.end();
        self.phase.reset();
        self.emit_phase(Phase::Idle);
        self.observer.on_event(&CeremonyEvent::Completed {
            ceremony: CeremonyKind::Registration,
            failure: outcome.failure_kind(),
        });
        outcome
    }

    async fn drive(
        &self,
        new_account: Option<NewAccountProfile>,
    ) -> Result<CeremonyOutcome, CeremonyError> {
        let issued = self.service.registration_options().await?;
        self.correlation.begin(issued.correlation)?;

        let options = decode_options(issued.options)?;
        let request = self.build_creation_request(&options)?;

        self.transition(Phase::AwaitingPlatform);
        let credential = self
            .authenticator
            .create(request)
            .await?
            .ok_or(CeremonyError::NoCredential)?;

        self.transition(Phase::Submitting);
        let correlation = self
            .correlation
            .current()
            .ok_or(CeremonyError::MissingCorrelation)?;
        let finish = RegistrationFinishRequest {
            credential: encode_credential(&credential)?,
            correlation,
            user_data: new_account.map(|profile| NewAccountPayload {
                email: profile.email,
                first_name: profile.first_name,
                last_name: profile.last_name,
            }),
        };

        let response = self.service.finish_registration(&finish).await?;
        self.conclude(response)
    }

    fn conclude(
        &self,
        response: RegistrationFinishResponse,
    ) -> Result<CeremonyOutcome, CeremonyError> {
        if response.is_new_user {
            let access = response.access.ok_or_else(|| {
                CeremonyError::MalformedResponse(
                    "New-account response is missing an access token".to_string(),
                )
            })?;
            let refresh = response.refresh.ok_or_else(|| {
                CeremonyError::MalformedResponse(
                    "New-account response is missing a refresh token".to_string(),
                )
            })?;
            let account = response.user.ok_or_else(|| {
                CeremonyError::MalformedResponse(
                    "New-account response is missing the account".to_string(),
                )
            })?;

            Ok(CeremonyOutcome::NewAccount {
                tokens: Tokens { access, refresh },
                account: account.into(),
                requires_email_verification: response.requires_email_verification,
            })
        } else {
            let summary = response.credential.ok_or_else(|| {
                CeremonyError::MalformedResponse(
                    "Credential-added response is missing the credential".to_string(),
                )
            })?;
            let credential = self.registry.add(summary.into());
            Ok(CeremonyOutcome::CredentialAdded { credential })
        }
    }

    fn build_creation_request(
        &self,
        options: &CeremonyOptions,
    ) -> Result<CredentialCreationRequest, CeremonyError> {
        let user = options.user.clone().ok_or_else(|| {
            CeremonyError::MalformedResponse(
                "Registration options are missing the user entity".to_string(),
            )
        })?;

        let mut selection = options.authenticator_selection.clone();
        let mut exclude = options.credential_descriptors.clone();
        if self.policy.permit_multiple_authenticators {
            // Let further devices enroll: no exclusion list, prefer roaming
            // authenticators over the one already on this platform.
            selection.attachment = AuthenticatorAttachment::CrossPlatform;
            exclude.clear();
        }

        Ok(CredentialCreationRequest {
            challenge: options.challenge.clone(),
            relying_party: options.relying_party.clone(),
            user,
            allowed_algorithms: options.allowed_algorithms.clone(),
            timeout_ms: options.timeout_ms,
            attestation: options.attestation,
            authenticator_selection: selection,
            exclude_credentials: exclude,
        })
    }

    fn transition(&self, phase: Phase) {
        self.phase.set(phase);
        self.emit_phase(phase);
    }

    fn emit_phase(&self, phase: Phase) {
        self.observer.on_event(&CeremonyEvent::PhaseChanged {
            ceremony: CeremonyKind::Registration,
            phase,
        });
    }
}

fn decode_options(payload: RegistrationOptionsPayload) -> Result<CeremonyOptions, CeremonyError> {
    let challenge = transport::decode(&payload.challenge)?;
    let user_id = transport::decode(&payload.user.id)?;
    let descriptors = decode_descriptors(&payload.exclude_credentials)?;

    Ok(CeremonyOptions {
        challenge,
        relying_party: RelyingParty {
            id: payload.rp.id,
            display_name: payload.rp.name,
        },
        user: Some(UserEntity {
            id: user_id,
            name: payload.user.name,
            display_name: payload.user.display_name,
        }),
        allowed_algorithms: payload.pub_key_cred_params.iter().map(|p| p.alg).collect(),
        timeout_ms: payload
            .timeout
            .unwrap_or(*crate::config::CEREMONY_TIMEOUT_MS),
        attestation: AttestationPreference::parse(&payload.attestation),
        authenticator_selection: AuthenticatorSelection {
            user_verification: SelectionRequirement::parse(
                &payload.authenticator_selection.user_verification,
            ),
            resident_key: SelectionRequirement::parse(
                &payload.authenticator_selection.resident_key,
            ),
            attachment: AuthenticatorAttachment::parse(
                payload
                    .authenticator_selection
                    .authenticator_attachment
                    .as_deref(),
            ),
        },
        credential_descriptors: descriptors,
    })
}

fn encode_credential(credential: &CredentialResult) -> Result<RegisterCredential, CeremonyError> {
    match &credential.payload {
        CredentialPayload::Registration {
            attestation_object,
            client_data_json,
            transports,
        } => Ok(RegisterCredential {
            id: credential.id.clone(),
            raw_id: transport::encode(&credential.raw_id),
            response: AttestationPayload {
                attestation_object: transport::encode(attestation_object),
                client_data_json: transport::encode(client_data_json),
                transports: transports.clone(),
            },
            type_: "public-key".to_string(),
        }),
        CredentialPayload::Authentication { .. } => Err(CeremonyError::UnexpectedPayload),
    }
}
