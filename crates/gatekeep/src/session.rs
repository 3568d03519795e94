//! Session identifiers and the session table.

use std::collections::HashMap;

use crate::error::{AuthError, Result};
use crate::registry::UserId;

/// Maps session identifiers to the user that owns them.
///
/// Each identifier is bound at most once. Sessions are never persisted.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<String, UserId>,
}

impl SessionTable {
    /// Binds `session_id` to `owner`, failing if the identifier is taken.
    pub(crate) fn register(&mut self, session_id: &str, owner: UserId) -> Result<()> {
        if self.sessions.contains_key(session_id) {
            return Err(AuthError::AlreadyAuthenticated);
        }
        self.sessions.insert(session_id.to_string(), owner);
        Ok(())
    }

    /// Removes a binding. Unknown identifiers are ignored.
    pub(crate) fn revoke(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Removes every binding owned by `owner` and returns how many went.
    pub(crate) fn revoke_all(&mut self, owner: UserId) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, id| *id != owner);
        before - self.sessions.len()
    }

    /// Returns the owner of a session.
    pub(crate) fn owner(&self, session_id: &str) -> Option<UserId> {
        self.sessions.get(session_id).copied()
    }

    /// Returns every session identifier bound to `owner`.
    pub(crate) fn sessions_of(&self, owner: UserId) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|(_, id)| **id == owner)
            .map(|(session, _)| session.clone())
            .collect()
    }

    pub(crate) fn count_of(&self, owner: UserId) -> usize {
        self.sessions.values().filter(|id| **id == owner).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Generates a cryptographically secure session identifier.
#[must_use]
pub fn generate_session_id() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(&bytes)
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generation() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();

        assert_eq!(id1.len(), 64);
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut table = SessionTable::default();
        table.register("s1", UserId(1)).unwrap();

        assert!(matches!(
            table.register("s1", UserId(2)),
            Err(AuthError::AlreadyAuthenticated)
        ));
        assert_eq!(table.owner("s1"), Some(UserId(1)));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut table = SessionTable::default();
        table.register("s1", UserId(1)).unwrap();

        assert!(table.revoke("s1"));
        assert!(!table.revoke("s1"));
        assert_eq!(table.owner("s1"), None);
    }

    #[test]
    fn test_sessions_per_owner() {
        let mut table = SessionTable::default();
        table.register("a", UserId(1)).unwrap();
        table.register("b", UserId(1)).unwrap();
        table.register("c", UserId(2)).unwrap();

        let mut owned = table.sessions_of(UserId(1));
        owned.sort();
        assert_eq!(owned, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(table.count_of(UserId(2)), 1);

        assert_eq!(table.revoke_all(UserId(1)), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.count_of(UserId(1)), 0);
    }
}
