//! User records and the username-keyed registry.

use std::collections::HashMap;

use crate::access::AccessLevel;
use crate::error::{AuthError, Result};

/// Identity of a user record within one store.
///
/// Identities are never reused, so a user deleted and registered again
/// under the same name is a different user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub(crate) u64);

/// A registered user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub(crate) id: UserId,
    pub(crate) username: String,
    /// Argon2 PHC string; never plaintext once stored.
    pub(crate) password_hash: String,
    pub(crate) access: AccessLevel,
    /// Session issued by the most recent login.
    pub(crate) current_session: Option<String>,
    /// Per-user scratch data. Never persisted.
    pub(crate) vars: HashMap<String, serde_json::Value>,
}

/// The user table, keyed by username.
#[derive(Debug, Default)]
pub struct Registry {
    users: HashMap<String, UserRecord>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    /// Looks up a user by name, returning it only if it still has `id`.
    pub(crate) fn get_by_id(&self, username: &str, id: UserId) -> Option<&UserRecord> {
        self.users.get(username).filter(|user| user.id == id)
    }

    /// Finds a user by identity alone.
    pub(crate) fn find(&self, id: UserId) -> Option<&UserRecord> {
        self.users.values().find(|user| user.id == id)
    }

    pub(crate) fn get_by_id_mut(&mut self, username: &str, id: UserId) -> Option<&mut UserRecord> {
        self.users.get_mut(username).filter(|user| user.id == id)
    }

    pub(crate) fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Inserts a user whose password is already hashed and returns its
    /// new identity.
    pub(crate) fn insert(
        &mut self,
        username: &str,
        password_hash: String,
        access: AccessLevel,
    ) -> Result<UserId> {
        if self.users.contains_key(username) {
            return Err(AuthError::AlreadyExists);
        }

        self.next_id += 1;
        let id = UserId(self.next_id);
        self.users.insert(
            username.to_string(),
            UserRecord {
                id,
                username: username.to_string(),
                password_hash,
                access,
                current_session: None,
                vars: HashMap::new(),
            },
        );
        Ok(id)
    }

    /// Removes a user if it still has identity `id`.
    pub(crate) fn remove(&mut self, username: &str, id: UserId) -> Option<UserRecord> {
        if self.get_by_id(username, id).is_some() {
            self.users.remove(username)
        } else {
            None
        }
    }

    pub(crate) fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.users.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn len(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut registry = Registry::default();
        let id = registry
            .insert("alice", "hash".to_string(), AccessLevel::USER)
            .unwrap();

        let user = registry.get("alice").unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.access, AccessLevel::USER);
        assert!(user.current_session.is_none());
        assert!(registry.get("bob").is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let mut registry = Registry::default();
        registry
            .insert("alice", "first".to_string(), AccessLevel::ADMIN)
            .unwrap();

        assert!(matches!(
            registry.insert("alice", "second".to_string(), AccessLevel::USER),
            Err(AuthError::AlreadyExists)
        ));
        let user = registry.get("alice").unwrap();
        assert_eq!(user.password_hash, "first");
        assert_eq!(user.access, AccessLevel::ADMIN);
    }

    #[test]
    fn test_identities_are_not_reused() {
        let mut registry = Registry::default();
        let first = registry
            .insert("alice", "hash".to_string(), AccessLevel::USER)
            .unwrap();
        assert!(registry.remove("alice", first).is_some());

        let second = registry
            .insert("alice", "hash".to_string(), AccessLevel::USER)
            .unwrap();
        assert_ne!(first, second);
        assert!(registry.get_by_id("alice", first).is_none());
        assert!(registry.find(first).is_none());
        assert_eq!(registry.find(second).unwrap().username, "alice");
        assert!(registry.remove("alice", first).is_none());
        assert!(registry.contains("alice"));
    }

    #[test]
    fn test_usernames_sorted() {
        let mut registry = Registry::default();
        for name in ["carol", "alice", "bob"] {
            registry
                .insert(name, "hash".to_string(), AccessLevel::USER)
                .unwrap();
        }
        assert_eq!(registry.usernames(), vec!["alice", "bob", "carol"]);
        assert_eq!(registry.len(), 3);
    }
}
