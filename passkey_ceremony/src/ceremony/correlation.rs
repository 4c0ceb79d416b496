use std::sync::Mutex;

use super::errors::CeremonyError;

/// Holds the opaque correlation token for one in-flight ceremony.
///
/// The token binds the options step to the finish step of a single attempt.
/// It lives in volatile memory only, scoped to one coordinator instance; a
/// page reload invalidates the in-progress ceremony rather than resurrecting
/// a stale, already-consumed token.
pub struct CorrelationStore {
    token: Mutex<Option<String>>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }

    /// Takes ownership of a token for the duration of one ceremony.
    ///
    /// Fails if a token is already held, which means a ceremony is in flight.
    pub fn begin(&self, token: String) -> Result<(), CeremonyError> {
        let mut held = self.lock();
        if held.is_some() {
            return Err(CeremonyError::AlreadyInProgress);
        }
        *held = Some(token);
        Ok(())
    }

    /// The held token, byte-for-byte as the identity service issued it.
    pub fn current(&self) -> Option<String> {
        self.lock().clone()
    }

    /// Discards the held token. Idempotent, always safe to call.
    pub fn end(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for CorrelationStore {
    fn default() -> Self {
        Self::new()
    }
}
