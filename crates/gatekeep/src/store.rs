//! The user store.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::access::AccessLevel;
use crate::backends::{Backend, MemoryBackend, SqliteBackend, StoredUser, DEFAULT_DATABASE_PATH};
use crate::config::StoreConfig;
use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::registry::Registry;
use crate::session::{generate_session_id, SessionTable};
use crate::user::User;

/// Registry and session table, always guarded together.
#[derive(Debug, Default)]
pub struct State {
    pub(crate) registry: Registry,
    pub(crate) sessions: SessionTable,
}

struct Inner<B> {
    state: RwLock<State>,
    config: StoreConfig,
    backend: B,
}

/// A store of users and their login sessions.
///
/// Cloning is cheap and every clone refers to the same users. All
/// operations are synchronous; hashing runs outside the store lock while
/// backend writes run inside it.
pub struct Store<B: Backend = MemoryBackend> {
    inner: Arc<Inner<B>>,
}

/// A store that keeps everything in memory.
pub type MemoryStore = Store<MemoryBackend>;

/// A store that persists users (not sessions) to SQLite.
pub type PersistentStore = Store<SqliteBackend>;

impl<B: Backend> Clone for Store<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Store<MemoryBackend> {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::from_parts(config, MemoryBackend, Registry::default())
    }
}

impl Default for Store<MemoryBackend> {
    fn default() -> Self {
        Self::in_memory(StoreConfig::default())
    }
}

impl Store<SqliteBackend> {
    /// Opens a store backed by the SQLite database at `path`, loading every
    /// user already stored there.
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        Self::with_backend(config, SqliteBackend::open(path)?)
    }

    /// Opens a store backed by [`DEFAULT_DATABASE_PATH`].
    pub fn open_default(config: StoreConfig) -> Result<Self> {
        Self::open(DEFAULT_DATABASE_PATH, config)
    }
}

impl<B: Backend> Store<B> {
    /// Creates a store over `backend`, hydrating the registry from it.
    pub fn with_backend(config: StoreConfig, backend: B) -> Result<Self> {
        let mut registry = Registry::default();
        for row in backend.load()? {
            if let Err(err) = registry.insert(&row.username, row.password_hash, row.access) {
                warn!(username = %row.username, error = %err, "skipping stored user");
            }
        }
        debug!(users = registry.len(), "store loaded");

        Ok(Self::from_parts(config, backend, registry))
    }

    fn from_parts(config: StoreConfig, backend: B, registry: Registry) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State {
                    registry,
                    sessions: SessionTable::default(),
                }),
                config,
                backend,
            }),
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub(crate) fn state(&self) -> &RwLock<State> {
        &self.inner.state
    }

    pub(crate) fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Registers a new user.
    ///
    /// The credentials must pass validation and the username must be
    /// unused. The password is hashed before it is stored.
    pub fn add(&self, username: &str, password: &str, access: AccessLevel) -> Result<()> {
        self.config().validate(username, password)?;

        // Skip the expensive hash for an obvious duplicate.
        if self.state().read().registry.contains(username) {
            warn!(username, "add: user already exists");
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let mut state = self.state().write();
        if state.registry.contains(username) {
            warn!(username, "add: user already exists");
            return Err(AuthError::AlreadyExists);
        }
        self.backend().insert(&StoredUser {
            username: username.to_string(),
            password_hash: password_hash.clone(),
            access,
        })?;
        state.registry.insert(username, password_hash, access)?;
        drop(state);

        info!(username, %access, "user added");
        Ok(())
    }

    /// Returns a handle to the named user.
    ///
    /// The handle carries the session issued by the user's most recent
    /// login, if any.
    pub fn user_from_username(&self, username: &str) -> Result<User<B>> {
        let state = self.state().read();
        let Some(record) = state.registry.get(username) else {
            warn!(username, "get: user not found");
            return Err(AuthError::NotFound);
        };

        Ok(User::new(
            self.clone(),
            record.id,
            record.username.clone(),
            record.current_session.clone().unwrap_or_default(),
        ))
    }

    /// Returns a handle to the user owning `session_id`, carrying that
    /// session.
    pub fn user_from_id(&self, session_id: &str) -> Result<User<B>> {
        let state = self.state().read();
        let record = state
            .sessions
            .owner(session_id)
            .and_then(|id| state.registry.find(id))
            .ok_or_else(|| {
                warn!("get: session not found");
                AuthError::NotFound
            })?;

        Ok(User::new(
            self.clone(),
            record.id,
            record.username.clone(),
            session_id.to_string(),
        ))
    }

    /// Authenticates a user and opens a new session.
    ///
    /// A random session identifier is generated unless `session_id` is
    /// given. An empty `session_id` fails with
    /// [`AuthError::InvalidCredentials`]. Fails with
    /// [`AuthError::AlreadyAuthenticated`] when the identifier is already
    /// bound or the user already holds the configured maximum number of
    /// sessions.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        session_id: Option<&str>,
    ) -> Result<User<B>> {
        self.config().validate(username, password)?;
        if session_id.is_some_and(str::is_empty) {
            warn!(username, "login: empty session id");
            return Err(AuthError::InvalidCredentials);
        }

        let (id, password_hash) = {
            let state = self.state().read();
            let Some(record) = state.registry.get(username) else {
                warn!(username, "login: user not found");
                return Err(AuthError::NotFound);
            };
            (record.id, record.password_hash.clone())
        };

        if let Err(err) = verify_password(password, &password_hash) {
            debug!(username, "login: password mismatch");
            return Err(err);
        }

        let session = session_id.map_or_else(generate_session_id, str::to_string);
        let max_sessions = self.config().settings().max_sessions;

        let mut state = self.state().write();
        let State { registry, sessions } = &mut *state;

        // The user may have been deleted or changed its password meanwhile.
        let record = registry
            .get_by_id_mut(username, id)
            .ok_or(AuthError::NotFound)?;
        if record.password_hash != password_hash {
            return Err(AuthError::VerificationFailed);
        }

        if max_sessions > 0 && sessions.count_of(id) >= max_sessions {
            warn!(username, max_sessions, "login: session limit reached");
            return Err(AuthError::AlreadyAuthenticated);
        }
        sessions.register(&session, id)?;
        record.current_session = Some(session.clone());
        drop(state);

        debug!(username, "login succeeded");
        Ok(User::new(self.clone(), id, username.to_string(), session))
    }

    /// Revokes the given sessions. Unknown identifiers are ignored.
    pub fn remove_sessions<I, S>(&self, session_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state().write();
        let mut revoked = 0usize;
        for session_id in session_ids {
            if state.sessions.revoke(session_id.as_ref()) {
                revoked += 1;
            }
        }
        drop(state);
        debug!(revoked, "sessions removed");
    }

    /// Returns whether a user with this name exists.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.state().read().registry.contains(username)
    }

    /// Returns all usernames in sorted order.
    #[must_use]
    pub fn usernames(&self) -> Vec<String> {
        self.state().read().registry.usernames()
    }

    /// Returns the number of registered users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.state().read().registry.len()
    }

    /// Returns the number of live sessions across all users.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.state().read().sessions.len()
    }

    /// Closes the backend. The store must not be used afterwards; backend
    /// operations will fail.
    pub fn close(&self) -> Result<()> {
        self.backend().close()
    }
}
