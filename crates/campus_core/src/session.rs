//! Read-only view of the authenticated session.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// A user together with the token the server issued for them.
///
/// Keeping both in one record makes "token without user" unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

/// Lifecycle state derived from a [`SessionSnapshot`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// What consumers see of the session at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub credentials: Option<Credentials>,
    pub loading: bool,
}

impl SessionSnapshot {
    /// The state every session starts in: empty and loading until restored.
    pub fn starting() -> Self {
        Self {
            credentials: None,
            loading: true,
        }
    }

    pub fn authenticated(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            loading: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> AuthState {
        if self.loading {
            AuthState::Authenticating
        } else if self.credentials.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }
}
