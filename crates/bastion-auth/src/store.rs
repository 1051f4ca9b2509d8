//! # Credential Store
//!
//! Repository of user records keyed by username.
//!
//! ## Password Handling on Save
//!
//! | Draft password            | Existing user | Result                        |
//! |---------------------------|---------------|-------------------------------|
//! | already in hash format    | any           | stored as-is                  |
//! | plaintext                 | any           | hashed, then stored           |
//! | absent                    | yes           | existing hash kept unchanged  |
//! | absent                    | no            | [`StoreError::MissingPassword`] |
//!
//! Hashing happens before the write lock is taken, so a slow bcrypt round
//! never blocks concurrent lookups.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use bastion_core::{Email, PasswordHash, Role, User, UserId, Username, ValidationError};
use bastion_crypto::PasswordHasher;
use parking_lot::RwLock;

use crate::error::StoreError;

/// Lookup and persistence of user records.
///
/// Implementations must be safe under concurrent reads. Writes are rare
/// (provisioning and admin edits).
pub trait CredentialStore: Send + Sync {
    /// Exact-match lookup. An unknown username is `None`, not an error.
    fn find_by_username(&self, username: &Username) -> Option<User>;

    /// Insert or update a user. See the module docs for password rules.
    fn save(&self, draft: UserDraft) -> Result<User, StoreError>;

    /// Whether a user with this username exists.
    fn exists_by_username(&self, username: &Username) -> bool;

    /// Whether any user has this email address.
    fn exists_by_email(&self, email: &Email) -> bool;

    /// Number of stored users.
    fn count(&self) -> usize;
}

/// Input to [`CredentialStore::save`].
///
/// `password` may hold plaintext or an existing stored hash.
#[derive(Clone)]
pub struct UserDraft {
    /// Key of the record to insert or update.
    pub username: Username,
    /// New password, or `None` to keep the current one on update.
    pub password: Option<String>,
    /// Optional contact address.
    pub email: Option<Email>,
    /// Role labels; must be non-empty.
    pub roles: BTreeSet<Role>,
    /// Whether the account may log in.
    pub enabled: bool,
}

impl UserDraft {
    /// Enabled draft with a password and no roles or email yet.
    pub fn new(username: Username, password: impl Into<String>) -> Self {
        Self {
            username,
            password: Some(password.into()),
            email: None,
            roles: BTreeSet::new(),
            enabled: true,
        }
    }

    /// Draft that updates an existing user's attributes but leaves the
    /// password untouched.
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password: None,
            email: user.email.clone(),
            roles: user.roles.clone(),
            enabled: user.enabled,
        }
    }

    /// Add a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDraft")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// In-process credential store.
///
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<Username, User>>>,
    hasher: Arc<dyn PasswordHasher>,
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("users", &self.users.read().len())
            .finish_non_exhaustive()
    }
}

impl MemoryCredentialStore {
    /// Create an empty store that hashes plaintext passwords with `hasher`.
    pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            hasher,
        }
    }

    fn prepare_password(&self, draft: &UserDraft) -> Result<Option<PasswordHash>, StoreError> {
        match draft.password.as_deref() {
            None => Ok(None),
            Some("") => Err(StoreError::EmptyPassword(draft.username.clone())),
            Some(candidate) if self.hasher.is_hash(candidate) => {
                Ok(Some(PasswordHash::from_stored(candidate)))
            }
            Some(plaintext) => Ok(Some(self.hasher.hash(plaintext)?)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_by_username(&self, username: &Username) -> Option<User> {
        self.users.read().get(username).cloned()
    }

    fn save(&self, draft: UserDraft) -> Result<User, StoreError> {
        if draft.roles.is_empty() {
            return Err(ValidationError::NoRoles(draft.username.into_inner()).into());
        }
        let new_hash = self.prepare_password(&draft)?;

        let mut users = self.users.write();
        if let Some(email) = &draft.email {
            let taken = users
                .values()
                .any(|u| u.username != draft.username && u.email.as_ref() == Some(email));
            if taken {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }

        let existing = users.get(&draft.username);
        let id = existing.map(|u| u.id).unwrap_or_else(UserId::new);
        let password_hash = match (new_hash, existing) {
            (Some(hash), _) => hash,
            (None, Some(current)) => current.password_hash.clone(),
            (None, None) => return Err(StoreError::MissingPassword(draft.username)),
        };
        let created = existing.is_none();

        let user = User {
            id,
            username: draft.username,
            password_hash,
            email: draft.email,
            roles: draft.roles,
            enabled: draft.enabled,
        };
        users.insert(user.username.clone(), user.clone());
        drop(users);

        tracing::debug!(username = %user.username, created, "saved user");
        Ok(user)
    }

    fn exists_by_username(&self, username: &Username) -> bool {
        self.users.read().contains_key(username)
    }

    fn exists_by_email(&self, email: &Email) -> bool {
        self.users
            .read()
            .values()
            .any(|u| u.email.as_ref() == Some(email))
    }

    fn count(&self) -> usize {
        self.users.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_crypto::BcryptHasher;

    fn store() -> MemoryCredentialStore {
        MemoryCredentialStore::new(Arc::new(BcryptHasher::new(4).unwrap()))
    }

    fn name(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    fn role(s: &str) -> Role {
        Role::new(s).unwrap()
    }

    #[test]
    fn unknown_user_is_none() {
        assert!(store().find_by_username(&name("ghost")).is_none());
    }

    #[test]
    fn plaintext_is_hashed_on_insert() {
        let store = store();
        let saved = store
            .save(UserDraft::new(name("alice"), "secret").with_role(role("USER")))
            .unwrap();
        assert_ne!(saved.password_hash.as_str(), "secret");
        assert!(saved.password_hash.as_str().starts_with("$2a$04$"));
        assert_eq!(store.find_by_username(&name("alice")), Some(saved));
    }

    #[test]
    fn existing_hash_is_not_rehashed() {
        let store = store();
        let hash = BcryptHasher::new(4).unwrap().hash("secret").unwrap();
        let saved = store
            .save(UserDraft::new(name("alice"), hash.as_str()).with_role(role("USER")))
            .unwrap();
        assert_eq!(saved.password_hash, hash);
    }

    #[test]
    fn update_without_password_keeps_hash_and_id() {
        let store = store();
        let first = store
            .save(UserDraft::new(name("alice"), "secret").with_role(role("USER")))
            .unwrap();
        let second = store
            .save(UserDraft::from_user(&first).with_role(role("ADMIN")).with_enabled(false))
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.password_hash, first.password_hash);
        assert!(!second.enabled);
        assert_eq!(second.roles.len(), 2);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn update_with_plaintext_rehashes() {
        let store = store();
        let first = store
            .save(UserDraft::new(name("alice"), "secret").with_role(role("USER")))
            .unwrap();
        let mut draft = UserDraft::from_user(&first);
        draft.password = Some("changed".into());
        let second = store.save(draft).unwrap();
        assert_eq!(second.id, first.id);
        assert_ne!(second.password_hash, first.password_hash);
    }

    #[test]
    fn insert_without_password_fails() {
        let store = store();
        let mut draft = UserDraft::new(name("bob"), "x").with_role(role("USER"));
        draft.password = None;
        assert!(matches!(store.save(draft), Err(StoreError::MissingPassword(_))));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn empty_password_rejected() {
        let draft = UserDraft::new(name("bob"), "").with_role(role("USER"));
        assert!(matches!(store().save(draft), Err(StoreError::EmptyPassword(_))));
    }

    #[test]
    fn roles_required() {
        let draft = UserDraft::new(name("bob"), "pw");
        assert!(matches!(
            store().save(draft),
            Err(StoreError::Validation(ValidationError::NoRoles(_)))
        ));
    }

    #[test]
    fn email_unique_across_users() {
        let store = store();
        let email = Email::new("shared@example.com").unwrap();
        store
            .save(
                UserDraft::new(name("alice"), "a")
                    .with_role(role("USER"))
                    .with_email(email.clone()),
            )
            .unwrap();
        assert!(store.exists_by_email(&email));
        assert!(!store.exists_by_email(&Email::new("other@example.com").unwrap()));

        let clash = UserDraft::new(name("bob"), "b")
            .with_role(role("USER"))
            .with_email(Email::new("SHARED@example.com").unwrap());
        assert!(matches!(store.save(clash), Err(StoreError::DuplicateEmail(_))));

        // Re-saving the owner with the same email is fine.
        let alice = store.find_by_username(&name("alice")).unwrap();
        assert!(store.save(UserDraft::from_user(&alice)).is_ok());
    }

    #[test]
    fn exists_by_username() {
        let store = store();
        store
            .save(UserDraft::new(name("alice"), "a").with_role(role("USER")))
            .unwrap();
        assert!(store.exists_by_username(&name("alice")));
        assert!(!store.exists_by_username(&name("bob")));
    }

    #[test]
    fn clones_share_data() {
        let a = store();
        let b = a.clone();
        a.save(UserDraft::new(name("alice"), "a").with_role(role("USER")))
            .unwrap();
        assert_eq!(b.count(), 1);
    }

    #[test]
    fn concurrent_reads() {
        let store = store();
        store
            .save(UserDraft::new(name("alice"), "a").with_role(role("USER")))
            .unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = store.clone();
                std::thread::spawn(move || s.find_by_username(&name("alice")).is_some())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }

    #[test]
    fn draft_debug_redacts_password() {
        let draft = UserDraft::new(name("alice"), "hunter2");
        assert!(!format!("{draft:?}").contains("hunter2"));
    }
}
