//! User handles.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::access::AccessLevel;
use crate::backends::{Backend, MemoryBackend};
use crate::error::{AuthError, Result};
use crate::password::hash_password;
use crate::registry::UserId;
use crate::store::{State, Store};

/// A handle to a user in a [`Store`], carrying one session identifier.
///
/// The handle never caches whether its session is live. Every
/// session-dependent operation checks the store's session table first, so
/// a handle whose session was revoked elsewhere simply stops being
/// authorized.
///
/// After [`User::delete`] the handle is inert: its username and session
/// are empty, its access level is [`AccessLevel::PUBLIC`] and it has no
/// variables.
pub struct User<B: Backend = MemoryBackend> {
    store: Store<B>,
    id: UserId,
    username: String,
    session: String,
}

impl<B: Backend> User<B> {
    pub(crate) const fn new(store: Store<B>, id: UserId, username: String, session: String) -> Self {
        Self {
            store,
            id,
            username,
            session,
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the live session identifier, or an empty string.
    ///
    /// A session that is no longer live is cleared from the handle.
    pub fn session(&mut self) -> &str {
        if !self.is_authenticated() {
            self.session.clear();
        }
        &self.session
    }

    /// Returns whether the handle's session is live.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session_is_valid(&self.store.state().read())
    }

    /// A session is live only while the session table binds it to this
    /// very user record.
    fn session_is_valid(&self, state: &State) -> bool {
        !self.session.is_empty()
            && state.sessions.owner(&self.session) == Some(self.id)
            && state.registry.get_by_id(&self.username, self.id).is_some()
    }

    /// Returns every live session of this user.
    #[must_use]
    pub fn sessions(&self) -> Vec<String> {
        let state = self.store.state().read();
        if state.registry.get_by_id(&self.username, self.id).is_none() {
            return Vec::new();
        }
        state.sessions.sessions_of(self.id)
    }

    /// Returns the user's access level.
    #[must_use]
    pub fn access(&self) -> AccessLevel {
        self.store
            .state()
            .read()
            .registry
            .get_by_id(&self.username, self.id)
            .map_or(AccessLevel::PUBLIC, |record| record.access)
    }

    /// Changes the user's password.
    ///
    /// Requires a live session, password changes to be enabled, and the
    /// new password to pass validation.
    pub fn change_password(&self, password: &str) -> Result<()> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAllowed);
        }
        let config = self.store.config();
        if !config.settings().allow_password_change {
            return Err(AuthError::NotAllowed);
        }
        config.validate(&self.username, password)?;

        let password_hash = hash_password(password)?;

        let mut state = self.store.state().write();
        if !self.session_is_valid(&state) {
            return Err(AuthError::NotAllowed);
        }
        self.store
            .backend()
            .update_password(&self.username, &password_hash)?;
        if let Some(record) = state.registry.get_by_id_mut(&self.username, self.id) {
            record.password_hash = password_hash;
        }
        drop(state);

        info!(username = %self.username, "password changed");
        Ok(())
    }

    /// Overwrites the user's access level.
    ///
    /// No session or privilege check is made; the host application must
    /// gate this itself.
    pub fn change_access(&self, access: AccessLevel) -> Result<()> {
        let mut state = self.store.state().write();
        if state.registry.get_by_id(&self.username, self.id).is_none() {
            return Err(AuthError::NotFound);
        }
        self.store.backend().update_access(&self.username, access)?;
        if let Some(record) = state.registry.get_by_id_mut(&self.username, self.id) {
            record.access = access;
        }
        drop(state);

        info!(username = %self.username, %access, "access changed");
        Ok(())
    }

    /// Revokes the handle's session.
    pub fn log_out(&mut self) {
        let mut state = self.store.state().write();
        let State { registry, sessions } = &mut *state;

        if sessions.owner(&self.session) == Some(self.id) {
            sessions.revoke(&self.session);
        }
        if let Some(record) = registry.get_by_id_mut(&self.username, self.id) {
            if record.current_session.as_deref() == Some(self.session.as_str()) {
                record.current_session = None;
            }
        }
        drop(state);

        debug!(username = %self.username, "logged out");
        self.session.clear();
    }

    /// Revokes every session of this user.
    pub fn log_out_fully(&mut self) {
        let mut state = self.store.state().write();
        let State { registry, sessions } = &mut *state;

        let revoked = sessions.revoke_all(self.id);
        if let Some(record) = registry.get_by_id_mut(&self.username, self.id) {
            record.current_session = None;
        }
        drop(state);

        debug!(username = %self.username, revoked, "logged out everywhere");
        self.session.clear();
    }

    /// Deletes the user and all of its sessions, then scrubs the handle.
    ///
    /// Deleting an already deleted user is a no-op.
    pub fn delete(&mut self) -> Result<()> {
        let mut state = self.store.state().write();
        if state.registry.get_by_id(&self.username, self.id).is_some() {
            self.store.backend().delete(&self.username)?;
            state.registry.remove(&self.username, self.id);
            let revoked = state.sessions.revoke_all(self.id);
            info!(username = %self.username, revoked, "user deleted");
        }
        drop(state);

        self.username.clear();
        self.session.clear();
        Ok(())
    }

    /// Checks whether the user may act at `required` level.
    ///
    /// A [`AccessLevel::DELETED`] user always fails and a
    /// [`AccessLevel::PUBLIC`] requirement always passes. Anything else
    /// needs a rank at least as privileged as `required` and a live
    /// session.
    #[must_use]
    pub fn check_access(&self, required: AccessLevel) -> bool {
        if !self.access().permits(required) {
            return false;
        }
        if required == AccessLevel::PUBLIC {
            return true;
        }
        self.is_authenticated()
    }

    /// Stores a per-user variable. Variables live only in memory.
    pub fn set_var<T: Serialize>(&self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut state = self.store.state().write();
        let record = state
            .registry
            .get_by_id_mut(&self.username, self.id)
            .ok_or(AuthError::NotFound)?;
        record.vars.insert(key.to_string(), value);
        Ok(())
    }

    /// Reads a per-user variable.
    #[must_use]
    pub fn var<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.store.state().read();
        state
            .registry
            .get_by_id(&self.username, self.id)
            .and_then(|record| record.vars.get(key))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Removes a per-user variable, returning its previous value.
    pub fn remove_var(&self, key: &str) -> Option<serde_json::Value> {
        let mut state = self.store.state().write();
        state
            .registry
            .get_by_id_mut(&self.username, self.id)
            .and_then(|record| record.vars.remove(key))
    }

    /// Returns a copy of all variables, or `None` once the user is gone.
    #[must_use]
    pub fn vars(&self) -> Option<HashMap<String, serde_json::Value>> {
        let state = self.store.state().read();
        state
            .registry
            .get_by_id(&self.username, self.id)
            .map(|record| record.vars.clone())
    }
}

impl<B: Backend> Clone for User<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            id: self.id,
            username: self.username.clone(),
            session: self.session.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for User<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
