//! Deterministic fakes shared across coordinator and registry tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::ceremony::{CeremonyEvent, CeremonyObserver, CredentialPayload, CredentialResult};
use crate::identity::{
    AccountPayload, AuthenticationFinishRequest, AuthenticationFinishResponse,
    AuthenticationOptionsPayload, AuthenticationOptionsResponse, CredentialSummary,
    IdentityService, RegistrationFinishRequest, RegistrationFinishResponse,
    RegistrationOptionsPayload, RegistrationOptionsResponse, RelyingPartyPayload, RevokeStatus,
    SelectionPayload, ServiceError, UserPayload,
};
use crate::platform::{
    Authenticator, CredentialAssertionRequest, CredentialCreationRequest, PlatformError,
};
use crate::transport;

type Scripted<T> = Mutex<Vec<Result<T, ServiceError>>>;

/// Identity service double driven by scripted responses.
///
/// Each operation pops the front of its queue; an empty queue yields a
/// rejection so an over-eager coordinator fails a test instead of hanging.
pub struct FakeIdentityService {
    registration_options: Scripted<RegistrationOptionsResponse>,
    registration_finishes: Scripted<RegistrationFinishResponse>,
    authentication_options: Scripted<AuthenticationOptionsResponse>,
    authentication_finishes: Scripted<AuthenticationFinishResponse>,
    credentials: Mutex<Vec<CredentialSummary>>,
    pub seen_registration_finishes: Mutex<Vec<RegistrationFinishRequest>>,
    pub seen_authentication_finishes: Mutex<Vec<AuthenticationFinishRequest>>,
}

impl FakeIdentityService {
    pub fn new() -> Self {
        Self {
            registration_options: Mutex::new(Vec::new()),
            registration_finishes: Mutex::new(Vec::new()),
            authentication_options: Mutex::new(Vec::new()),
            authentication_finishes: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
            seen_registration_finishes: Mutex::new(Vec::new()),
            seen_authentication_finishes: Mutex::new(Vec::new()),
        }
    }

    pub fn push_registration_options(
        &self,
        response: Result<RegistrationOptionsResponse, ServiceError>,
    ) {
        self.registration_options.lock().unwrap().push(response);
    }

    pub fn push_registration_finish(
        &self,
        response: Result<RegistrationFinishResponse, ServiceError>,
    ) {
        self.registration_finishes.lock().unwrap().push(response);
    }

    pub fn push_authentication_options(
        &self,
        response: Result<AuthenticationOptionsResponse, ServiceError>,
    ) {
        self.authentication_options.lock().unwrap().push(response);
    }

    pub fn push_authentication_finish(
        &self,
        response: Result<AuthenticationFinishResponse, ServiceError>,
    ) {
        self.authentication_finishes.lock().unwrap().push(response);
    }

    pub fn push_credential(&self, credential: CredentialSummary) {
        self.credentials.lock().unwrap().push(credential);
    }

    fn pop<T>(queue: &Scripted<T>) -> Result<T, ServiceError> {
        let mut queue = queue.lock().unwrap();
        if queue.is_empty() {
            return Err(ServiceError::Rejected("no scripted response".to_string()));
        }
        queue.remove(0)
    }
}

#[async_trait]
impl IdentityService for FakeIdentityService {
    async fn registration_options(&self) -> Result<RegistrationOptionsResponse, ServiceError> {
        Self::pop(&self.registration_options)
    }

    async fn finish_registration(
        &self,
        request: &RegistrationFinishRequest,
    ) -> Result<RegistrationFinishResponse, ServiceError> {
        self.seen_registration_finishes
            .lock()
            .unwrap()
            .push(request.clone());
        Self::pop(&self.registration_finishes)
    }

    async fn authentication_options(&self) -> Result<AuthenticationOptionsResponse, ServiceError> {
        Self::pop(&self.authentication_options)
    }

    async fn finish_authentication(
        &self,
        request: &AuthenticationFinishRequest,
    ) -> Result<AuthenticationFinishResponse, ServiceError> {
        self.seen_authentication_finishes
            .lock()
            .unwrap()
            .push(request.clone());
        Self::pop(&self.authentication_finishes)
    }

    async fn list_credentials(
        &self,
        _account_id: &str,
    ) -> Result<Vec<CredentialSummary>, ServiceError> {
        Ok(self.credentials.lock().unwrap().clone())
    }

    async fn revoke_credential(&self, credential_id: &str) -> Result<RevokeStatus, ServiceError> {
        let mut credentials = self.credentials.lock().unwrap();
        let before = credentials.len();
        credentials.retain(|c| c.id != credential_id);
        if credentials.len() < before {
            Ok(RevokeStatus::Revoked)
        } else {
            Ok(RevokeStatus::NotFound)
        }
    }
}

enum AuthenticatorScript {
    Succeed,
    Fail(PlatformError),
    ResolveNone,
}

/// Platform authenticator double.
///
/// `succeed` fabricates a credential echoing the request challenge inside its
/// `clientDataJSON`, like a real platform would. Requests are captured for
/// assertions; use it through an `Arc` to keep an inspection handle.
pub struct FakeAuthenticator {
    script: AuthenticatorScript,
    pub create_requests: Mutex<Vec<CredentialCreationRequest>>,
    pub get_requests: Mutex<Vec<CredentialAssertionRequest>>,
}

impl FakeAuthenticator {
    fn with_script(script: AuthenticatorScript) -> Self {
        Self {
            script,
            create_requests: Mutex::new(Vec::new()),
            get_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn succeed() -> Self {
        Self::with_script(AuthenticatorScript::Succeed)
    }

    pub fn fail(error: PlatformError) -> Self {
        Self::with_script(AuthenticatorScript::Fail(error))
    }

    /// Finishes without producing a credential.
    pub fn resolve_none() -> Self {
        Self::with_script(AuthenticatorScript::ResolveNone)
    }

    fn client_data(ceremony_type: &str, challenge: &[u8]) -> Vec<u8> {
        serde_json::json!({
            "type": ceremony_type,
            "challenge": transport::encode(challenge),
            "origin": "http://localhost:3000",
        })
        .to_string()
        .into_bytes()
    }
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn create(
        &self,
        request: CredentialCreationRequest,
    ) -> Result<Option<CredentialResult>, PlatformError> {
        let challenge = request.challenge.clone();
        self.create_requests.lock().unwrap().push(request);
        match &self.script {
            AuthenticatorScript::Succeed => Ok(Some(CredentialResult {
                id: "fake-credential".to_string(),
                raw_id: b"fake-credential".to_vec(),
                payload: CredentialPayload::Registration {
                    attestation_object: b"attestation".to_vec(),
                    client_data_json: Self::client_data("webauthn.create", &challenge),
                    transports: vec!["internal".to_string()],
                },
            })),
            AuthenticatorScript::Fail(error) => Err(error.clone()),
            AuthenticatorScript::ResolveNone => Ok(None),
        }
    }

    async fn get(
        &self,
        request: CredentialAssertionRequest,
    ) -> Result<Option<CredentialResult>, PlatformError> {
        let challenge = request.challenge.clone();
        self.get_requests.lock().unwrap().push(request);
        match &self.script {
            AuthenticatorScript::Succeed => Ok(Some(CredentialResult {
                id: "fake-credential".to_string(),
                raw_id: b"fake-credential".to_vec(),
                payload: CredentialPayload::Authentication {
                    authenticator_data: b"authenticator-data".to_vec(),
                    client_data_json: Self::client_data("webauthn.get", &challenge),
                    signature: b"signature".to_vec(),
                    user_handle: Some(b"user-handle".to_vec()),
                },
            })),
            AuthenticatorScript::Fail(error) => Err(error.clone()),
            AuthenticatorScript::ResolveNone => Ok(None),
        }
    }
}

/// Observer that records every emitted event for later assertions.
pub struct RecordingObserver {
    pub events: Mutex<Vec<CeremonyEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl CeremonyObserver for RecordingObserver {
    fn on_event(&self, event: &CeremonyEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn summary(id: &str, created_at: DateTime<Utc>) -> CredentialSummary {
    CredentialSummary {
        id: id.to_string(),
        transports: vec!["internal".to_string()],
        created_at,
        last_used_at: None,
        use_count: 0,
    }
}

pub fn registration_options_response(
    challenge: &[u8],
    correlation: &str,
) -> RegistrationOptionsResponse {
    RegistrationOptionsResponse {
        options: RegistrationOptionsPayload {
            challenge: transport::encode(challenge),
            rp: RelyingPartyPayload {
                id: "localhost".to_string(),
                name: "Dashboard".to_string(),
            },
            user: UserPayload {
                id: transport::encode(b"user-1"),
                name: "admin@example.com".to_string(),
                display_name: "Admin".to_string(),
            },
            pub_key_cred_params: vec![crate::identity::PubKeyCredParam {
                type_: "public-key".to_string(),
                alg: -7,
            }],
            authenticator_selection: SelectionPayload {
                user_verification: "discouraged".to_string(),
                resident_key: "discouraged".to_string(),
                authenticator_attachment: Some("platform".to_string()),
            },
            timeout: Some(60_000),
            attestation: "none".to_string(),
            exclude_credentials: Vec::new(),
        },
        correlation: correlation.to_string(),
    }
}

pub fn authentication_options_response(
    challenge: &[u8],
    correlation: &str,
) -> AuthenticationOptionsResponse {
    AuthenticationOptionsResponse {
        options: AuthenticationOptionsPayload {
            challenge: transport::encode(challenge),
            timeout: Some(60_000),
            rp_id: "localhost".to_string(),
            allow_credentials: Vec::new(),
            user_verification: "preferred".to_string(),
        },
        correlation: correlation.to_string(),
    }
}

pub fn new_account_response() -> RegistrationFinishResponse {
    RegistrationFinishResponse {
        is_new_user: true,
        access: Some("a".to_string()),
        refresh: Some("r".to_string()),
        user: Some(AccountPayload {
            id: "7".to_string(),
            email: "new@example.com".to_string(),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
            email_verified: false,
        }),
        credential: None,
        requires_email_verification: true,
    }
}

pub fn credential_added_response(credential: CredentialSummary) -> RegistrationFinishResponse {
    RegistrationFinishResponse {
        credential: Some(credential),
        ..RegistrationFinishResponse::default()
    }
}

pub fn auth_finish_response() -> AuthenticationFinishResponse {
    AuthenticationFinishResponse {
        access: "a".to_string(),
        refresh: "r".to_string(),
        user: AccountPayload {
            id: "7".to_string(),
            email: "admin@example.com".to_string(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email_verified: true,
        },
    }
}
