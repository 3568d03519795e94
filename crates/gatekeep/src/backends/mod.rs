//! Persistence backends.
//!
//! A backend receives every durable user mutation while the store lock is
//! held. Sessions and per-user variables never reach a backend.

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::{SqliteBackend, CREATE_USER_TABLE_SQL, DEFAULT_DATABASE_PATH};

use crate::access::AccessLevel;
use crate::error::Result;

/// A persisted user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique username.
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Access level.
    pub access: AccessLevel,
}

/// Durable side effects of user mutations.
///
/// All methods are synchronous and are called inside the store's critical
/// section, so a slow backend slows every store operation.
pub trait Backend: Send + Sync {
    /// Returns every persisted user, used to hydrate a new store.
    fn load(&self) -> Result<Vec<StoredUser>>;

    /// Persists a newly registered user.
    fn insert(&self, user: &StoredUser) -> Result<()>;

    /// Replaces the stored password hash of `username`.
    fn update_password(&self, username: &str, password_hash: &str) -> Result<()>;

    /// Replaces the stored access level of `username`.
    fn update_access(&self, username: &str, access: AccessLevel) -> Result<()>;

    /// Deletes the row for `username`.
    fn delete(&self, username: &str) -> Result<()>;

    /// Releases the backend. Later calls fail.
    fn close(&self) -> Result<()>;
}
