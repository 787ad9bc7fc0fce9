//! Contract with the remote auth service

use crate::error::AuthError;
use async_trait::async_trait;
use campus_core::{Role, User};
use serde::{Deserialize, Serialize};

/// Body returned by a successful login call.
///
/// Both fields are optional on the wire; a response missing either is
/// treated as a failed login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Remote authentication endpoint
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a token and user record
    async fn login(&self, email: &str, password: &str, role: Role)
        -> Result<LoginResponse, AuthError>;

    /// Invalidate `token` on the server
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
}
