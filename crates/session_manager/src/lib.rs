//! # Session Manager
//!
//! Owns the signed-in user and token for the campus client: restores a
//! persisted session at startup, signs in and out through a remote auth
//! service, and publishes every transition to subscribers.

pub mod auth;
pub mod error;
pub mod manager;
pub mod storage;

// Re-exports
pub use auth::{AuthService, LoginResponse};
pub use error::{AuthError, SessionError, StoreError};
pub use manager::{SessionManager, AUTH_TOKEN_KEY, DEFAULT_LOGIN_TIMEOUT, LEGACY_KEYS, USER_KEY};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

pub use campus_core::{Credentials, SessionSnapshot};
