//! # gatekeep
//!
//! An embeddable user and session store for host applications.
//!
//! This crate provides:
//! - A [`Store`] of users with Argon2-hashed passwords and integer access
//!   levels
//! - In-memory login sessions with an optional per-user ceiling
//! - [`User`] handles that re-check their session on every privileged call
//! - Two interchangeable backends: [`MemoryBackend`] and [`SqliteBackend`]
//!
//! ## Quick Start
//!
//! ```rust
//! use gatekeep::{AccessLevel, MemoryStore};
//!
//! let store = MemoryStore::default();
//! store.add("alice", "correct horse", AccessLevel::USER).unwrap();
//!
//! let mut alice = store.login("alice", "correct horse", None).unwrap();
//! assert!(alice.check_access(AccessLevel::USER));
//! assert!(!alice.check_access(AccessLevel::ADMIN));
//!
//! alice.log_out();
//! assert!(!alice.check_access(AccessLevel::USER));
//! ```
//!
//! ## Access Levels
//!
//! Lower values are more privileged. [`AccessLevel::PUBLIC`] checks always
//! pass and users at [`AccessLevel::DELETED`] never pass anything; other
//! checks need a live session.
//!
//! ## Configuration
//!
//! ```rust
//! use gatekeep::{MemoryStore, StoreConfig};
//!
//! let config = StoreConfig::builder()
//!     .username_pattern("[a-z]+")
//!     .max_sessions(1)
//!     .allow_password_change(false)
//!     .build()
//!     .expect("patterns compile");
//! let store = MemoryStore::in_memory(config);
//! # let _ = store;
//! ```
//!
//! ## Persistence
//!
//! [`PersistentStore::open`] keeps users in a SQLite file. Sessions are
//! never persisted. The SQLite backend blocks on its own runtime, so async
//! callers should go through `tokio::task::spawn_blocking`.
//!
//! ## Logging
//!
//! Lookups that miss and rejected registrations are reported through
//! `tracing`; install a subscriber to see them.

mod access;
pub mod backends;
mod config;
mod error;
mod password;
mod registry;
mod session;
mod store;
mod user;

pub use access::AccessLevel;
pub use backends::{Backend, MemoryBackend, SqliteBackend, StoredUser};
pub use config::{
    StoreConfig, StoreConfigBuilder, UserSettings, DEFAULT_PASSWORD_PATTERN,
    DEFAULT_USERNAME_PATTERN,
};
pub use error::{AuthError, Result};
pub use password::{hash_password, verify_password};
pub use registry::UserId;
pub use session::generate_session_id;
pub use store::{MemoryStore, PersistentStore, Store};
pub use user::User;
