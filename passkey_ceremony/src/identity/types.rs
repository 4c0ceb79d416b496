//! Wire shapes exchanged with the identity service.
//!
//! Binary fields travel as base64url transport text; options use the
//! camelCase field names of the credential API, finish bodies use the
//! service's snake_case names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST /ceremony/registration/options`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationOptionsResponse {
    pub options: RegistrationOptionsPayload,
    /// Opaque correlation token, resubmitted byte-for-byte with the finish
    pub correlation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptionsPayload {
    pub challenge: String,
    pub rp: RelyingPartyPayload,
    pub user: UserPayload,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub authenticator_selection: SelectionPayload,
    #[serde(default)]
    pub timeout: Option<u32>,
    pub attestation: String,
    #[serde(default)]
    pub exclude_credentials: Vec<DescriptorPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelyingPartyPayload {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub type_: String,
    pub alg: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub user_verification: String,
    pub resident_key: String,
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub transports: Vec<String>,
}

/// Response of `POST /ceremony/authentication/options`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationOptionsResponse {
    pub options: AuthenticationOptionsPayload,
    pub correlation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptionsPayload {
    pub challenge: String,
    #[serde(default)]
    pub timeout: Option<u32>,
    pub rp_id: String,
    /// Empty means the discoverable-credential flow
    #[serde(default)]
    pub allow_credentials: Vec<DescriptorPayload>,
    pub user_verification: String,
}

/// Body of `POST /ceremony/registration/finish`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationFinishRequest {
    pub credential: RegisterCredential,
    pub correlation: String,
    /// Present only when registration should create a brand-new account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<NewAccountPayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredential {
    pub id: String,
    pub raw_id: String,
    pub response: AttestationPayload,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationPayload {
    pub attestation_object: String,
    pub client_data_json: String,
    pub transports: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccountPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /ceremony/authentication/finish`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationFinishRequest {
    pub credential: AssertionCredential,
    pub correlation: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionCredential {
    pub id: String,
    pub raw_id: String,
    pub response: AssertionPayload,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionPayload {
    pub authenticator_data: String,
    pub client_data_json: String,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Response of `POST /ceremony/registration/finish`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationFinishResponse {
    #[serde(default)]
    pub is_new_user: bool,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<AccountPayload>,
    #[serde(default)]
    pub credential: Option<CredentialSummary>,
    #[serde(default)]
    pub requires_email_verification: bool,
}

/// Response of `POST /ceremony/authentication/finish`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationFinishResponse {
    pub access: String,
    pub refresh: String,
    pub user: AccountPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountPayload {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Server-held view of an enrolled credential, as listed by
/// `GET /credentials?account=ID`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSummary {
    pub id: String,
    #[serde(default)]
    pub transports: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub use_count: u32,
}

/// Error body the identity service uses for rejections.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
