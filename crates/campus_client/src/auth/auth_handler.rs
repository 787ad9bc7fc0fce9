use async_trait::async_trait;
use campus_core::Role;
use log::{debug, error};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use session_manager::{AuthError, AuthService, LoginResponse};
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
}

/// Error body shapes the API is known to send
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

fn transport(e: impl std::fmt::Display) -> AuthError {
    AuthError::Transport(e.to_string())
}

/// [`AuthService`] backed by the platform's HTTP API
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    client: Arc<ClientWithMiddleware>,
    api_base: String,
}

impl HttpAuthService {
    pub fn new(client: Arc<ClientWithMiddleware>, api_base: impl Into<String>) -> Self {
        HttpAuthService {
            client,
            api_base: api_base.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::PROXY_AUTHENTICATION_REQUIRED {
            error!("Proxy authentication required, check the proxy settings in config.toml");
        }
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<LoginResponse, AuthError> {
        let request = LoginRequest {
            email,
            password,
            role,
        };
        let response = self
            .client
            .post(self.endpoint("auth/login"))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check_status(response).await?;

        let body = response.bytes().await.map_err(transport)?;
        match serde_json::from_slice::<LoginResponse>(&body) {
            Ok(login) => {
                debug!("Login response received for {email}");
                Ok(login)
            }
            Err(e) => {
                let body_str = String::from_utf8_lossy(&body);
                error!("Failed to decode login response: {e}: {body_str}");
                Err(AuthError::InvalidResponse(e.to_string()))
            }
        }
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("auth/logout"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        Self::check_status(response).await?;
        Ok(())
    }
}
