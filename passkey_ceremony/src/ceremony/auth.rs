use std::sync::Arc;

use super::classifier::{classify, message_for};
use super::correlation::CorrelationStore;
use super::decode_descriptors;
use super::errors::{CeremonyError, FailureKind};
use super::types::{
    CeremonyEvent, CeremonyKind, CeremonyObserver, CeremonyOutcome, CredentialPayload,
    CredentialResult, Phase, PhaseCell, SelectionRequirement, Tokens, TracingObserver,
};
use crate::identity::{
    AssertionCredential, AssertionPayload, AuthenticationFinishRequest,
    AuthenticationFinishResponse, AuthenticationOptionsPayload, IdentityService,
};
use crate::platform::{Authenticator, CredentialAssertionRequest};
use crate::transport;

/// Drives the credential-assertion ceremony end to end.
///
/// Same single-flight and cleanup discipline as the registration side: one
/// in-flight ceremony per instance, correlation token discarded on every
/// exit path, all failures reported as [`CeremonyOutcome::Failure`].
pub struct AuthenticationCoordinator<S: IdentityService, A: Authenticator> {
    service: Arc<S>,
    authenticator: A,
    observer: Arc<dyn CeremonyObserver>,
    phase: PhaseCell,
    correlation: CorrelationStore,
}

impl<S: IdentityService, A: Authenticator> AuthenticationCoordinator<S, A> {
    pub fn new(service: Arc<S>, authenticator: A) -> Self {
        Self {
            service,
            authenticator,
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

    /// Runs one authentication ceremony: options request, platform assertion,
    /// finish submission.
    ///
    /// An empty allow list from the service selects the discoverable-credential
    /// flow; the platform then offers whichever credentials it knows for the
    /// relying party.
    pub async fn authenticate(&self) -> CeremonyOutcome {
        if !self.phase.try_begin() {
            // The in-flight ceremony owns the correlation store; leave it alone.
            return CeremonyOutcome::Failure {
                kind: FailureKind::CeremonyAlreadyInProgress,
                message: message_for(FailureKind::CeremonyAlreadyInProgress).to_string(),
            };
        }
        self.emit_phase(Phase::OptionsRequested);

        let outcome = match self.drive().await {
            Ok(outcome) => outcome,
            Err(err) => {
                let (kind, message) = classify(&err);
                tracing::warn!("Authentication ceremony failed: {} ({:?})", message, kind);
                CeremonyOutcome::Failure { kind, message }
            }
        };

        self.correlation.end();
        self.phase.reset();
        self.emit_phase(Phase::Idle);
        self.observer.on_event(&CeremonyEvent::Completed {
            ceremony: CeremonyKind::Authentication,
            failure: outcome.failure_kind(),
        });
        outcome
    }

    async fn drive(&self) -> Result<CeremonyOutcome, CeremonyError> {
        let issued = self.service.authentication_options().await?;
        self.correlation.begin(issued.correlation)?;

        let request = build_assertion_request(issued.options)?;

        self.transition(Phase::AwaitingPlatform);
        let credential = self
            .authenticator
            .get(request)
            .await?
            .ok_or(CeremonyError::NoCredential)?;

        self.transition(Phase::Submitting);
        let correlation = self
            .correlation
            .current()
            .ok_or(CeremonyError::MissingCorrelation)?;
        let finish = AuthenticationFinishRequest {
            credential: encode_credential(&credential)?,
            correlation,
        };

        let response = self.service.finish_authentication(&finish).await?;
        Ok(conclude(response))
    }

    fn transition(&self, phase: Phase) {
        self.phase.set(phase);
        self.emit_phase(phase);
    }

    fn emit_phase(&self, phase: Phase) {
        self.observer.on_event(&CeremonyEvent::PhaseChanged {
            ceremony: CeremonyKind::Authentication,
            phase,
        });
    }
}

fn conclude(response: AuthenticationFinishResponse) -> CeremonyOutcome {
    CeremonyOutcome::Authenticated {
        tokens: Tokens {
            access: response.access,
            refresh: response.refresh,
        },
        account: response.user.into(),
    }
}

fn build_assertion_request(
    payload: AuthenticationOptionsPayload,
) -> Result<CredentialAssertionRequest, CeremonyError> {
    let challenge = transport::decode(&payload.challenge)?;
    let allow_credentials = decode_descriptors(&payload.allow_credentials)?;

    Ok(CredentialAssertionRequest {
        challenge,
        relying_party_id: payload.rp_id,
        timeout_ms: payload
            .timeout
            .unwrap_or(*crate::config::CEREMONY_TIMEOUT_MS),
        user_verification: SelectionRequirement::parse(&payload.user_verification),
        allow_credentials,
    })
}

fn encode_credential(credential: &CredentialResult) -> Result<AssertionCredential, CeremonyError> {
    match &credential.payload {
        CredentialPayload::Authentication {
            authenticator_data,
            client_data_json,
            signature,
            user_handle,
        } => Ok(AssertionCredential {
            id: credential.id.clone(),
            raw_id: transport::encode(&credential.raw_id),
            response: AssertionPayload {
                authenticator_data: transport::encode(authenticator_data),
                client_data_json: transport::encode(client_data_json),
                signature: transport::encode(signature),
                user_handle: user_handle.as_deref().map(transport::encode),
            },
            type_: "public-key".to_string(),
        }),
        CredentialPayload::Registration { .. } => Err(CeremonyError::UnexpectedPayload),
    }
}
