//! Error types for the HTTP layer.

use thiserror::Error;

/// Errors raised while serving a request.
#[derive(Debug, Error)]
pub enum RestError {
    /// No route matched the request.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// A route matched the path but not the method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// The request body was not the expected JSON.
    #[error("{0}")]
    Body(#[from] serde_json::Error),

    /// The request declared a body type other than JSON.
    #[error("unsupported content type: {0}")]
    ContentType(String),

    /// The store rejected the operation.
    #[error("{0}")]
    Store(#[from] gatekeep::AuthError),

    /// A blocking store call panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type alias for HTTP layer operations.
pub type Result<T> = std::result::Result<T, RestError>;
