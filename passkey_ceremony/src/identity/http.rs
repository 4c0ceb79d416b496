use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::errors::ServiceError;
use super::types::{
    AuthenticationFinishRequest, AuthenticationFinishResponse, AuthenticationOptionsResponse,
    CredentialSummary, ErrorBody, RegistrationFinishRequest, RegistrationFinishResponse,
    RegistrationOptionsResponse,
};
use super::{IdentityService, RevokeStatus};

/// `reqwest`-backed identity service client.
pub struct HttpIdentityService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpIdentityService {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Builds a client from `IDENTITY_SERVICE_URL`, honoring a `.env` file.
    pub fn from_env() -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok();
        let base_url = Url::parse(&crate::config::IDENTITY_SERVICE_URL)
            .map_err(|e| ServiceError::Transport(format!("Invalid identity service URL: {e}")))?;
        Ok(Self::new(base_url))
    }

    fn endpoint(&self, path: &str) -> Url {
        // Url::join treats a base without a trailing slash as a file segment
        // and would drop it, so splice the paths explicitly.
        let mut url = self.base_url.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
        } else {
            Err(rejection_from(status, &bytes))
        }
    }
}

/// Maps a non-success response to a rejection, preferring the server's own
/// `{error}` message verbatim.
fn rejection_from(status: StatusCode, body: &[u8]) -> ServiceError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ServiceError::Rejected(parsed.error),
        Err(_) => ServiceError::Rejected(format!("Identity service returned {status}")),
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn registration_options(&self) -> Result<RegistrationOptionsResponse, ServiceError> {
        tracing::debug!("Requesting registration ceremony options");
        self.post_json("ceremony/registration/options", &serde_json::json!({}))
            .await
    }

    async fn finish_registration(
        &self,
        request: &RegistrationFinishRequest,
    ) -> Result<RegistrationFinishResponse, ServiceError> {
        tracing::debug!("Submitting finished registration credential");
        self.post_json("ceremony/registration/finish", request).await
    }

    async fn authentication_options(&self) -> Result<AuthenticationOptionsResponse, ServiceError> {
        tracing::debug!("Requesting authentication ceremony options");
        self.post_json("ceremony/authentication/options", &serde_json::json!({}))
            .await
    }

    async fn finish_authentication(
        &self,
        request: &AuthenticationFinishRequest,
    ) -> Result<AuthenticationFinishResponse, ServiceError> {
        tracing::debug!("Submitting finished authentication credential");
        self.post_json("ceremony/authentication/finish", request)
            .await
    }

    async fn list_credentials(
        &self,
        account_id: &str,
    ) -> Result<Vec<CredentialSummary>, ServiceError> {
        let url = self.endpoint("credentials");
        let response = self
            .client
            .get(url)
            .query(&[("account", account_id)])
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
        } else {
            Err(rejection_from(status, &bytes))
        }
    }

    async fn revoke_credential(&self, credential_id: &str) -> Result<RevokeStatus, ServiceError> {
        let url = self.endpoint(&format!("credentials/{credential_id}"));
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(RevokeStatus::Revoked),
            StatusCode::NOT_FOUND => Ok(RevokeStatus::NotFound),
            status => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::Transport(e.to_string()))?;
                Err(rejection_from(status, &bytes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_path() {
        let service = HttpIdentityService::new(Url::parse("http://localhost:8000/api").unwrap());
        let url = service.endpoint("ceremony/registration/options");
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/ceremony/registration/options"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_base() {
        let service = HttpIdentityService::new(Url::parse("http://localhost:8000/api/").unwrap());
        let url = service.endpoint("credentials");
        assert_eq!(url.as_str(), "http://localhost:8000/api/credentials");
    }

    #[test]
    fn test_rejection_prefers_error_body() {
        let err = rejection_from(StatusCode::BAD_REQUEST, br#"{"error": "Session expired"}"#);
        assert_eq!(err, ServiceError::Rejected("Session expired".to_string()));
    }

    #[test]
    fn test_rejection_falls_back_to_status() {
        let err = rejection_from(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        match err {
            ServiceError::Rejected(msg) => assert!(msg.contains("500")),
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }
}
