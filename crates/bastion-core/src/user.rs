//! # User Record
//!
//! The identity record owned by the credential store.
//!
//! ## Security Invariant
//!
//! `password_hash` holds the output of a one-way adaptive hash, never
//! plaintext. The only way to obtain a [`PasswordHash`] outside of tests is
//! through a password hasher or by loading a value that already has the
//! stored-hash format. Neither `User` nor `PasswordHash` prints the hash in
//! `Debug` output.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::{Email, UserId, Username};
use crate::role::Role;

/// An opaque stored password hash (for example a bcrypt `$2a$…` string).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already-computed hash string.
    ///
    /// No format check happens here. Hashers decide what a valid hash looks
    /// like; this type only keeps it out of logs.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Borrow the stored hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// A user known to the credential store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Surrogate identifier, stable across updates.
    pub id: UserId,
    /// Unique login name. Never changes after creation.
    pub username: Username,
    /// One-way hash of the user's password.
    pub password_hash: PasswordHash,
    /// Optional contact address, unique across users when present.
    pub email: Option<Email>,
    /// Role labels; order is irrelevant.
    pub roles: BTreeSet<Role>,
    /// Disabled accounts cannot log in.
    pub enabled: bool,
}

impl User {
    /// Account expiry is not modelled; accounts never expire.
    pub fn is_account_non_expired(&self) -> bool {
        true
    }

    /// Account locking is not modelled; accounts are never locked.
    pub fn is_account_non_locked(&self) -> bool {
        true
    }

    /// Credential expiry is not modelled; credentials never expire.
    pub fn is_credentials_non_expired(&self) -> bool {
        true
    }

    /// Whether the account may log in.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Granted authorities (`ROLE_<label>`) for every role the user holds.
    pub fn authorities(&self) -> Vec<String> {
        self.roles.iter().map(Role::authority).collect()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(),
            username: Username::new("erin").unwrap(),
            password_hash: PasswordHash::from_stored(
                "$2a$04$secretsecretsecretsecretsecretsecretsecretsecretsecre",
            ),
            email: Some(Email::new("erin@example.com").unwrap()),
            roles: [Role::new("USER").unwrap(), Role::new("ADMIN").unwrap()]
                .into_iter()
                .collect(),
            enabled: true,
        }
    }

    #[test]
    fn debug_redacts_hash() {
        let user = sample_user();
        let rendered = format!("{user:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("$2a$"));
        assert!(!format!("{:?}", user.password_hash).contains("$2a$"));
    }

    #[test]
    fn account_state_predicates() {
        let mut user = sample_user();
        assert!(user.is_account_non_expired());
        assert!(user.is_account_non_locked());
        assert!(user.is_credentials_non_expired());
        assert!(user.is_enabled());
        user.enabled = false;
        assert!(!user.is_enabled());
    }

    #[test]
    fn authorities_are_sorted_and_prefixed() {
        let user = sample_user();
        assert_eq!(user.authorities(), vec!["ROLE_ADMIN", "ROLE_USER"]);
    }
}
