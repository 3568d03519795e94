//! Access levels.
//!
//! An access level is a signed integer rank where a lower value means more
//! privilege. Four values are reserved by convention, but any integer may
//! be assigned to a user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user's privilege rank. Lower is more privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(pub i32);

impl AccessLevel {
    /// Never passes any check.
    pub const DELETED: Self = Self(-2);
    /// Required level that every user passes.
    pub const PUBLIC: Self = Self(-1);
    /// Administrators.
    pub const ADMIN: Self = Self(0);
    /// Regular users.
    pub const USER: Self = Self(1);

    /// Returns the raw integer rank.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns whether a user holding `self` satisfies `required`.
    ///
    /// This only compares ranks; [`crate::User::check_access`] additionally
    /// requires a live session for anything but [`AccessLevel::PUBLIC`].
    #[must_use]
    pub fn permits(self, required: Self) -> bool {
        if self == Self::DELETED {
            return false;
        }
        if required == Self::PUBLIC {
            return true;
        }
        self <= required
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::USER
    }
}

impl From<i32> for AccessLevel {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<AccessLevel> for i32 {
    fn from(level: AccessLevel) -> Self {
        level.0
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DELETED => write!(f, "deleted"),
            Self::PUBLIC => write!(f, "public"),
            Self::ADMIN => write!(f, "admin"),
            Self::USER => write!(f, "user"),
            Self(other) => write!(f, "level {other}"),
        }
    }
}
