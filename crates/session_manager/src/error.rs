//! Session manager error types

use campus_core::{ProfileError, Role};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single persistent store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by the remote auth service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),

    #[error("Auth service error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid user: {0}")]
    InvalidUser(#[from] ProfileError),

    #[error("Malformed login response: {0}")]
    MalformedResponse(&'static str),

    /// A remote login or logout exceeded the configured request timeout
    #[error("Auth request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Requested role {requested} but the server returned a {actual} account")]
    RoleMismatch { requested: Role, actual: Role },

    #[error("Login superseded by logout")]
    Superseded,

    #[error("No authenticated session")]
    NotAuthenticated,

    #[error("User {given} does not match the signed-in user {current}")]
    UserMismatch { current: String, given: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
