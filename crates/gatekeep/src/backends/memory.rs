//! Backend that persists nothing.

use super::{Backend, StoredUser};
use crate::access::AccessLevel;
use crate::error::Result;

/// Backend for purely in-memory stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    fn load(&self) -> Result<Vec<StoredUser>> {
        Ok(Vec::new())
    }

    fn insert(&self, _user: &StoredUser) -> Result<()> {
        Ok(())
    }

    fn update_password(&self, _username: &str, _password_hash: &str) -> Result<()> {
        Ok(())
    }

    fn update_access(&self, _username: &str, _access: AccessLevel) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _username: &str) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
