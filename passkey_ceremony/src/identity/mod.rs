//! Boundary to the remote identity service.
//!
//! The coordinators only consume this trait; the HTTP implementation lives in
//! [`http`] and tests substitute a scripted fake.

mod errors;
mod http;
pub(crate) mod types;

use async_trait::async_trait;

pub use errors::ServiceError;
pub use http::HttpIdentityService;
pub use types::{
    AccountPayload, AssertionCredential, AssertionPayload, AttestationPayload,
    AuthenticationFinishRequest, AuthenticationFinishResponse, AuthenticationOptionsPayload,
    AuthenticationOptionsResponse, CredentialSummary, DescriptorPayload, NewAccountPayload,
    PubKeyCredParam, RegisterCredential, RegistrationFinishRequest, RegistrationFinishResponse,
    RegistrationOptionsPayload, RegistrationOptionsResponse, RelyingPartyPayload,
    SelectionPayload, UserPayload,
};

/// Result of asking the service to revoke a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeStatus {
    Revoked,
    /// The id was not present; revoking twice in a row yields this
    NotFound,
}

/// Remote identity service that issues and verifies ceremonies.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// `POST /ceremony/registration/options`
    async fn registration_options(&self) -> Result<RegistrationOptionsResponse, ServiceError>;

    /// `POST /ceremony/registration/finish`
    async fn finish_registration(
        &self,
        request: &RegistrationFinishRequest,
    ) -> Result<RegistrationFinishResponse, ServiceError>;

    /// `POST /ceremony/authentication/options`
    async fn authentication_options(&self) -> Result<AuthenticationOptionsResponse, ServiceError>;

    /// `POST /ceremony/authentication/finish`
    async fn finish_authentication(
        &self,
        request: &AuthenticationFinishRequest,
    ) -> Result<AuthenticationFinishResponse, ServiceError>;

    /// `GET /credentials?account=ID`
    async fn list_credentials(
        &self,
        account_id: &str,
    ) -> Result<Vec<CredentialSummary>, ServiceError>;

    /// `DELETE /credentials/{id}`
    async fn revoke_credential(&self, credential_id: &str) -> Result<RevokeStatus, ServiceError>;
}
