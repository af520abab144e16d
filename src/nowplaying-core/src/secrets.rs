//! API key storage in the OS keyring.
//!
//! Keys live under the keyring service "nowplaying" with a user key of the
//! form `<service>/<profile>/api_key` (or `<service>/api_key` without a
//! profile). An environment variable always wins over the keyring so CI and
//! one-off runs never touch the credential store.

use thiserror::Error;

/// Keyring service name used for every nowplaying credential.
const SERVICE_NAME: &str = "nowplaying";

/// Environment variable consulted before the keyring.
pub const API_KEY_ENV: &str = "LASTFM_API_KEY";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("keyring access denied: {0}")]
    AccessDenied(String),

    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("keyring error: {0}")]
    Other(String),
}

impl From<keyring::Error> for SecretsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretsError::NotFound {
                key: "unknown".into(),
            },
            keyring::Error::NoStorageAccess(e) => SecretsError::AccessDenied(e.to_string()),
            keyring::Error::PlatformFailure(e) => SecretsError::Unavailable(e.to_string()),
            other => SecretsError::Other(other.to_string()),
        }
    }
}

pub type SecretsResult<T> = Result<T, SecretsError>;

/// Where a resolved API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

impl KeySource {
    pub fn describe(&self) -> &'static str {
        match self {
            KeySource::Environment => API_KEY_ENV,
            KeySource::Keyring => "OS keyring",
        }
    }
}

/// Credential store backed by the OS keyring.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    keyring_service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            keyring_service: SERVICE_NAME.into(),
        }
    }

    fn build_key(service: &str, profile: Option<&str>) -> String {
        match profile {
            Some(p) => format!("{service}/{p}/api_key"),
            None => format!("{service}/api_key"),
        }
    }

    fn entry(&self, key: &str) -> SecretsResult<keyring::Entry> {
        Ok(keyring::Entry::new(&self.keyring_service, key)?)
    }

    pub fn store_api_key(
        &self,
        service: &str,
        profile: Option<&str>,
        api_key: &str,
    ) -> SecretsResult<()> {
        let key = Self::build_key(service, profile);
        self.entry(&key)?.set_password(api_key)?;
        tracing::debug!(service, profile, "stored api key in keyring");
        Ok(())
    }

    /// Returns `SecretsError::NotFound` when nothing is stored.
    pub fn get_api_key(&self, service: &str, profile: Option<&str>) -> SecretsResult<String> {
        let key = Self::build_key(service, profile);
        match self.entry(&key)?.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(SecretsError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }

    /// Succeeds when the key was already absent.
    pub fn delete_api_key(&self, service: &str, profile: Option<&str>) -> SecretsResult<()> {
        let key = Self::build_key(service, profile);
        match self.entry(&key)?.delete_credential() {
            Ok(()) => {
                tracing::debug!(service, profile, "deleted api key from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the API key: environment first, then the keyring.
    pub fn resolve_api_key(
        &self,
        service: &str,
        profile: Option<&str>,
    ) -> SecretsResult<(String, KeySource)> {
        resolve_with(std::env::var(API_KEY_ENV).ok(), || {
            self.get_api_key(service, profile)
        })
    }
}

fn resolve_with<F>(env_value: Option<String>, keyring: F) -> SecretsResult<(String, KeySource)>
where
    F: FnOnce() -> SecretsResult<String>,
{
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(value) => Ok((value.trim().to_string(), KeySource::Environment)),
        None => keyring().map(|value| (value, KeySource::Keyring)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_building() {
        assert_eq!(
            CredentialStore::build_key("lastfm", Some("home")),
            "lastfm/home/api_key"
        );
        assert_eq!(CredentialStore::build_key("lastfm", None), "lastfm/api_key");
    }

    #[test]
    fn environment_wins_over_keyring() {
        let (key, source) = resolve_with(Some(" abc123 ".into()), || {
            panic!("keyring must not be consulted")
        })
        .expect("env key");
        assert_eq!(key, "abc123");
        assert_eq!(source, KeySource::Environment);
    }

    #[test]
    fn blank_environment_falls_back_to_keyring() {
        let (key, source) =
            resolve_with(Some("   ".into()), || Ok("from-keyring".into())).expect("keyring key");
        assert_eq!(key, "from-keyring");
        assert_eq!(source, KeySource::Keyring);
    }

    #[test]
    fn missing_everywhere_is_not_found() {
        let err = resolve_with(None, || {
            Err(SecretsError::NotFound {
                key: "lastfm/api_key".into(),
            })
        })
        .expect_err("should be missing");
        assert!(matches!(err, SecretsError::NotFound { .. }));
    }
}
