//! # Authenticator
//!
//! Turns a username/password pair into a signed bearer token.
//!
//! ## Login Steps
//!
//! 1. Look the user up. Unknown → [`AuthFailure::InvalidCredentials`].
//! 2. Verify the password against the stored hash. Mismatch →
//!    [`AuthFailure::InvalidCredentials`].
//! 3. Disabled account → [`AuthFailure::AccountDisabled`].
//! 4. Mint a token for the username with the configured TTL.
//!
//! An unknown username still pays for one hash verification against a dummy
//! hash, so response time does not reveal which usernames exist. No session
//! state is kept.
//!
//! `login` is CPU-bound (bcrypt). Async callers should run it on a blocking
//! thread.

use std::fmt;
use std::sync::Arc;

use bastion_core::{PasswordHash, Username};
use bastion_crypto::{CryptoError, PasswordHasher, TokenCodec, TokenTtl};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AuthFailure;
use crate::store::CredentialStore;

/// Plaintext behind the timing-equalisation hash. Never matches a real login
/// because the dummy result is discarded.
const DUMMY_PASSWORD: &str = "bastion-timing-equaliser";

/// A freshly minted token and its metadata.
#[derive(Clone, Serialize)]
pub struct IssuedToken {
    /// The compact bearer token.
    pub token: String,
    /// The authenticated username.
    pub subject: Username,
    /// Issue instant embedded in the token.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant embedded in the token.
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("subject", &self.subject)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Verifies credentials and issues tokens.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<TokenCodec>,
    ttl: TokenTtl,
    dummy_hash: PasswordHash,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("codec", &self.codec)
            .field("ttl_secs", &self.ttl.as_secs())
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Wire an authenticator from its collaborators.
    ///
    /// Computes the dummy hash up front, which costs one bcrypt round.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<TokenCodec>,
        ttl: TokenTtl,
    ) -> Result<Self, CryptoError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            codec,
            ttl,
            dummy_hash,
        })
    }

    /// TTL given to issued tokens.
    pub fn ttl(&self) -> TokenTtl {
        self.ttl
    }

    /// Log in at the current time.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthFailure> {
        self.login_at(username, password, Utc::now())
    }

    /// Log in with an explicit clock reading.
    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthFailure> {
        if username.trim().is_empty() || password.is_empty() {
            tracing::warn!("login rejected: blank username or password");
            return Err(AuthFailure::InvalidCredentials);
        }

        let user = Username::new(username)
            .ok()
            .and_then(|name| self.store.find_by_username(&name));
        let Some(user) = user else {
            // Burn the same work as a real verification; the result is irrelevant.
            let _ = self.hasher.verify(password, &self.dummy_hash);
            tracing::warn!(username, "login failed: unknown user");
            return Err(AuthFailure::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::warn!(username = %user.username, "login failed: bad password");
            return Err(AuthFailure::InvalidCredentials);
        }

        if !user.is_enabled() {
            tracing::warn!(username = %user.username, "login failed: account disabled");
            return Err(AuthFailure::AccountDisabled);
        }

        let token = self.codec.mint(user.username.as_str(), now, self.ttl)?;
        let claims = self
            .codec
            .parse(&token)
            .map_err(|e| AuthFailure::Unexpected(e.to_string()))?;

        tracing::info!(
            username = %user.username,
            expires_at = %claims.expires_at(),
            "login succeeded"
        );
        Ok(IssuedToken {
            token,
            subject: user.username,
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        })
    }
}
