//! # Error Types
//!
//! Two kinds only: failures while building the client, and failures of a
//! single command. A missing key or field is never an error here.

use thiserror::Error;

/// Result type for client construction.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Result type for per-call operations.
pub type OperationResult<T> = Result<T, OperationError>;

/// Errors surfaced while constructing a [`Client`](crate::Client).
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Address could not be split into host and port.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// TLS material is incomplete or inconsistent.
    #[error("invalid tls configuration: {0}")]
    InvalidTls(String),

    /// The store client refused to connect, authenticate or select the db.
    #[error(transparent)]
    Store(#[from] redis::RedisError),
}

/// Errors surfaced by a single command.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Server error reply, IO failure, or a reply that does not decode into
    /// the requested type.
    #[error(transparent)]
    Store(#[from] redis::RedisError),

    /// The client's context was cancelled before the command was sent.
    #[error("context cancelled")]
    Cancelled,

    /// The client's context deadline elapsed before or during the command.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl OperationError {
    /// Returns the underlying store error, if any.
    pub fn as_store(&self) -> Option<&redis::RedisError> {
        match self {
            OperationError::Store(err) => Some(err),
            _ => None,
        }
    }
}
