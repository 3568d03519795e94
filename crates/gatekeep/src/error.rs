//! Error types for the user store.

use thiserror::Error;

/// Errors returned by store and user handle operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is empty or fails its configured pattern.
    #[error("the username or password is empty or contained characters that are not allowed")]
    InvalidCredentials,

    /// No such user or session.
    #[error("not found")]
    NotFound,

    /// A user with this username is already registered.
    #[error("user already exists")]
    AlreadyExists,

    /// The session identifier is taken, or the user holds the maximum
    /// number of sessions.
    #[error("user already signed in, session limit reached or session id in use")]
    AlreadyAuthenticated,

    /// The action needs a live session, or is disabled by configuration.
    #[error("this action is not permitted")]
    NotAllowed,

    /// The password hashing primitive failed.
    #[error("password hashing error")]
    HashingFailure,

    /// The supplied password does not match the stored hash.
    #[error("password verification failed")]
    VerificationFailed,

    /// A username or password pattern did not compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A user variable could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from the persistent backend.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The persistent backend could not set up its runtime.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, AuthError>;
