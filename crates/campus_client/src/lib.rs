//! HTTP side of the campus client: configuration, the HTTP client stack and
//! the [`session_manager::AuthService`] implementation for the platform API.

pub mod auth;
pub mod client;
pub mod config;

pub use auth::HttpAuthService;
pub use client::{auth_service, build_http_client, build_retry_client, ClientError};
pub use config::{Config, ConfigError, ProxyAuth};
