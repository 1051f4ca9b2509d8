//! # Service Bootstrap
//!
//! Explicit construction of the auth service from its configuration:
//! hasher → credential store (seeded if enabled) → token codec →
//! authenticator.

use std::sync::Arc;

use bastion_auth::{seed_default_users, Authenticator, MemoryCredentialStore, StoreError};
use bastion_crypto::{BcryptHasher, CryptoError, PasswordHasher, TokenCodec};

use crate::config::AppConfig;
use crate::state::AppState;

/// Failures while wiring the service.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Hasher or codec construction failed.
    #[error("crypto setup failed: {0}")]
    Crypto(#[from] CryptoError),
    /// Seeding the credential store failed.
    #[error("credential store setup failed: {0}")]
    Store(#[from] StoreError),
}

/// Build the application state described by `config`.
pub fn bootstrap(config: &AppConfig) -> Result<AppState, BootstrapError> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.bcrypt_cost)?);
    let store = Arc::new(MemoryCredentialStore::new(Arc::clone(&hasher)));

    if config.seed_users {
        let created = seed_default_users(store.as_ref())?;
        tracing::info!(created, "credential store seeded");
    }

    let codec = Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())?);
    let authenticator = Authenticator::new(store.clone(), hasher, codec, config.token_ttl)?;

    Ok(AppState::new(Arc::new(authenticator), store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: bool) -> AppConfig {
        let mut cfg = AppConfig::new("bootstrap-test-secret-bootstrap-test");
        cfg.bcrypt_cost = 4;
        cfg.seed_users = seed;
        cfg
    }

    #[test]
    fn seeds_when_enabled() {
        let state = bootstrap(&config(true)).unwrap();
        assert_eq!(state.store.count(), 2);
        assert!(state.authenticator.login("admin", "admin").is_ok());
    }

    #[test]
    fn empty_store_when_disabled() {
        let state = bootstrap(&config(false)).unwrap();
        assert_eq!(state.store.count(), 0);
    }

    #[test]
    fn bad_cost_is_crypto_error() {
        let mut cfg = config(false);
        cfg.bcrypt_cost = 99;
        assert!(matches!(bootstrap(&cfg), Err(BootstrapError::Crypto(_))));
    }
}
