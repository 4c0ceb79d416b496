//! Enrolled-credential listing and revocation for the management UI.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{CredentialSummary, IdentityService, RevokeStatus, ServiceError};

/// Server-held, client-displayed view of an enrolled credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledCredential {
    pub id: String,
    /// Transports the authenticator reported at enrollment, for display
    pub transports: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub use_count: u32,
}

impl From<CredentialSummary> for EnrolledCredential {
    fn from(summary: CredentialSummary) -> Self {
        Self {
            id: summary.id,
            transports: summary.transports,
            created_at: summary.created_at,
            last_used_at: summary.last_used_at,
            use_count: summary.use_count,
        }
    }
}

/// Result of a revocation attempt.
///
/// Revoking an id that is not present reports `NotFound` rather than failing;
/// revoking the same id twice in a row therefore yields `Revoked` then
/// `NotFound`. This is a deliberate policy choice, not an accident of the
/// transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    NotFound,
}

/// Errors from credential registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Lists, records, and revokes enrolled credentials for an account.
///
/// The registry keeps a local mirror of the last listing so a registration
/// coordinator can record a freshly added credential without another round
/// trip, and so additions are idempotent per credential id.
pub struct CredentialRegistry<S: IdentityService> {
    service: Arc<S>,
    mirror: Mutex<Vec<EnrolledCredential>>,
}

impl<S: IdentityService> CredentialRegistry<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            mirror: Mutex::new(Vec::new()),
        }
    }

    /// Fetches the enrolled credentials for an account.
    ///
    /// Returned sorted by `created_at` descending, ties broken by `id`
    /// ascending, so listings are deterministic. An empty list is a valid
    /// result, not an error.
    pub async fn list(&self, account_id: &str) -> Result<Vec<EnrolledCredential>, RegistryError> {
        let mut credentials: Vec<EnrolledCredential> = self
            .service
            .list_credentials(account_id)
            .await?
            .into_iter()
            .map(EnrolledCredential::from)
            .collect();

        sort_for_display(&mut credentials);
        *self.lock() = credentials.clone();

        tracing::debug!("Listed {} enrolled credentials", credentials.len());
        Ok(credentials)
    }

    /// Records a credential the identity service just confirmed.
    ///
    /// Called by the registration coordinator after a `CredentialAdded`
    /// outcome. An id already present in the mirror is not duplicated; the
    /// existing entry is returned instead.
    pub(crate) fn add(&self, credential: EnrolledCredential) -> EnrolledCredential {
        let mut mirror = self.lock();
        if let Some(existing) = mirror.iter().find(|c| c.id == credential.id) {
            tracing::debug!("Credential {} already recorded", credential.id);
            return existing.clone();
        }
        mirror.push(credential.clone());
        sort_for_display(&mut mirror);
        credential
    }

    /// Revokes an enrolled credential.
    pub async fn revoke(&self, credential_id: &str) -> Result<RevokeOutcome, RegistryError> {
        match self.service.revoke_credential(credential_id).await? {
            RevokeStatus::Revoked => {
                self.lock().retain(|c| c.id != credential_id);
                tracing::debug!("Revoked credential {}", credential_id);
                Ok(RevokeOutcome::Revoked)
            }
            RevokeStatus::NotFound => Ok(RevokeOutcome::NotFound),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<EnrolledCredential>> {
        self.mirror
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn sort_for_display(credentials: &mut [EnrolledCredential]) {
    credentials.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
}
