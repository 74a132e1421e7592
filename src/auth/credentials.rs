//! BingX API key pairs.
//!
//! BingX identifies a caller by the API key sent in the `X-BX-APIKEY` header
//! and authenticates the request with an HMAC over the query string, keyed by
//! the secret key. Only the signer ever reads the secret.

use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "BINGX_API_KEY";
/// Environment variable holding the secret key.
pub const API_SECRET_VAR: &str = "BINGX_API_SECRET";

/// A BingX API key and its secret key.
///
/// `Debug` output never includes the secret.
#[derive(Clone)]
pub struct Credentials {
    /// Public key sent with every signed request
    pub api_key: String,
    secret_key: SecretString,
}

impl Credentials {
    /// Pair an API key with its secret key.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// The secret key, as HMAC key material.
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Source of the key pair used to sign requests.
///
/// Clients hold an `Arc<dyn CredentialsProvider>` and ask it for the pair on
/// each signed request, so a provider backed by a vault or a rotating store
/// only has to return its current pair.
pub trait CredentialsProvider: Send + Sync {
    /// The key pair to sign the next request with.
    fn get_credentials(&self) -> &Credentials;
}

impl CredentialsProvider for Credentials {
    fn get_credentials(&self) -> &Credentials {
        self
    }
}

/// A key pair fixed at construction.
#[derive(Clone, Debug)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    /// Wrap a key pair.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self(Credentials::new(api_key, secret_key))
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.0
    }
}

/// A key pair read once from the environment.
///
/// Reads `BINGX_API_KEY` and `BINGX_API_SECRET` unless other names are given.
#[derive(Debug)]
pub struct EnvCredentials(Credentials);

impl EnvCredentials {
    /// Read `BINGX_API_KEY` and `BINGX_API_SECRET`.
    ///
    /// Returns `None` if either is unset or blank.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_vars(API_KEY_VAR, API_SECRET_VAR)
    }

    /// Read the pair from the named variables.
    ///
    /// Returns `None` if either is unset or blank.
    pub fn try_from_env_vars(key_var: &str, secret_var: &str) -> Option<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Some(Self(Credentials::new(read(key_var)?, read(secret_var)?)))
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_debug_hides_secret_key() {
        let creds = Credentials::new("bx-key", "bx-secret-value");
        let printed = format!("{creds:?}");
        assert!(printed.contains("bx-key"));
        assert!(!printed.contains("bx-secret-value"));

        let provider = StaticCredentials::new("bx-key", "bx-secret-value");
        assert!(!format!("{provider:?}").contains("bx-secret-value"));
    }

    #[test]
    fn test_provider_behind_arc() {
        let provider: Arc<dyn CredentialsProvider> =
            Arc::new(StaticCredentials::new("key", "secret"));
        let creds = provider.get_credentials();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.expose_secret(), "secret");
    }

    #[test]
    fn test_env_credentials_missing_vars() {
        let provider = EnvCredentials::try_from_env_vars(
            "BINGX_TEST_SURELY_UNSET_KEY",
            "BINGX_TEST_SURELY_UNSET_SECRET",
        );
        assert!(provider.is_none());
    }
}
