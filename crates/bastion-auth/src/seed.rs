//! Default account provisioning for fresh deployments.

use bastion_core::{Email, Role, Username};

use crate::error::StoreError;
use crate::store::{CredentialStore, UserDraft};

/// `(username, password, role)` of each default account.
const DEFAULT_ACCOUNTS: [(&str, &str, &str); 2] =
    [("user", "password", "USER"), ("admin", "admin", "ADMIN")];

/// Provision the default accounts when the store is empty.
///
/// Returns the number of accounts created: zero when the store already holds
/// any user, so restarts never overwrite real data.
pub fn seed_default_users(store: &dyn CredentialStore) -> Result<usize, StoreError> {
    if store.count() > 0 {
        tracing::debug!(existing = store.count(), "credential store not empty, skipping seed");
        return Ok(0);
    }
    let mut created = 0;
    for (name, password, role) in DEFAULT_ACCOUNTS {
        let username = Username::new(name)?;
        let draft = UserDraft::new(username, password)
            .with_role(Role::new(role)?)
            .with_email(Email::new(format!("{name}@example.com"))?);
        store.save(draft)?;
        created += 1;
    }
    tracing::warn!(created, "provisioned default accounts; change their passwords");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;
    use bastion_crypto::{BcryptHasher, PasswordHasher};
    use std::sync::Arc;

    fn store() -> MemoryCredentialStore {
        MemoryCredentialStore::new(Arc::new(BcryptHasher::new(4).unwrap()))
    }

    #[test]
    fn seeds_empty_store() {
        let store = store();
        assert_eq!(seed_default_users(&store).unwrap(), 2);
        let user = store.find_by_username(&Username::new("user").unwrap()).unwrap();
        let admin = store.find_by_username(&Username::new("admin").unwrap()).unwrap();
        assert_eq!(user.authorities(), vec!["ROLE_USER"]);
        assert_eq!(admin.authorities(), vec!["ROLE_ADMIN"]);
        assert_eq!(admin.email.unwrap().as_str(), "admin@example.com");
        let hasher = BcryptHasher::new(4).unwrap();
        assert!(hasher.verify("password", &user.password_hash).unwrap());
    }

    #[test]
    fn does_not_touch_populated_store() {
        let store = store();
        store
            .save(
                UserDraft::new(Username::new("carol").unwrap(), "pw")
                    .with_role(Role::new("USER").unwrap()),
            )
            .unwrap();
        assert_eq!(seed_default_users(&store).unwrap(), 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn seeding_twice_is_a_noop() {
        let store = store();
        seed_default_users(&store).unwrap();
        assert_eq!(seed_default_users(&store).unwrap(), 0);
        assert_eq!(store.count(), 2);
    }
}
