use std::{env, sync::LazyLock};

/// Base URL of the identity service that issues and verifies ceremonies.
pub(crate) static IDENTITY_SERVICE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("IDENTITY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api".to_string())
});

/// Advisory user-interaction timeout used when the identity service omits one.
pub(crate) static CEREMONY_TIMEOUT_MS: LazyLock<u32> = LazyLock::new(|| {
    env::var("CEREMONY_TIMEOUT_MS").map_or(60_000, |v| match v.parse::<u32>() {
        Ok(ms) => ms,
        Err(_) => {
            tracing::warn!("Invalid CEREMONY_TIMEOUT_MS: {}. Using default 60000", v);
            60_000
        }
    })
});

/// Whether a deployment permits more than one enrolled authenticator per account.
///
/// When true, registration prefers cross-platform attachment and sends an empty
/// exclusion list to the platform.
pub(crate) static PERMIT_MULTIPLE_AUTHENTICATORS: LazyLock<bool> = LazyLock::new(|| {
    env::var("PASSKEY_PERMIT_MULTIPLE_AUTHENTICATORS").map_or(false, |v| {
        match v.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            invalid => {
                tracing::warn!(
                    "Invalid PASSKEY_PERMIT_MULTIPLE_AUTHENTICATORS: {}. Using default 'false'",
                    invalid
                );
                false
            }
        }
    })
});

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // LazyLock statics read the environment once, so these tests must run
    // before anything else touches them and must not race each other.
    #[test]
    #[serial]
    fn test_defaults_without_env() {
        unsafe {
            env::remove_var("IDENTITY_SERVICE_URL");
            env::remove_var("CEREMONY_TIMEOUT_MS");
            env::remove_var("PASSKEY_PERMIT_MULTIPLE_AUTHENTICATORS");
        }
        assert_eq!(*IDENTITY_SERVICE_URL, "http://localhost:8000/api");
        assert_eq!(*CEREMONY_TIMEOUT_MS, 60_000);
        assert!(!*PERMIT_MULTIPLE_AUTHENTICATORS);
    }
}
