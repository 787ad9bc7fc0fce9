//! Process-wide state, built once at startup and passed by reference.

use std::sync::Arc;

use campus_client::Config;
use campus_core::{RoleRouter, Route, SessionSnapshot, ThemeManager};
use session_manager::{
    AuthService, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SessionManager,
};

pub type Sessions = SessionManager<dyn KeyValueStore, dyn AuthService>;

pub struct AppContext {
    config: Config,
    session: Sessions,
    theme: ThemeManager,
}

impl AppContext {
    /// Build the context with the HTTP auth service described by `config`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let auth = campus_client::auth_service(&config)?;
        let store = Self::store_for(&config);
        Ok(Self::with_services(config, store, Arc::new(auth)))
    }

    pub fn with_services(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn AuthService>,
    ) -> Self {
        let session = SessionManager::new(store, auth).with_login_timeout(config.login_timeout());
        AppContext {
            config,
            session,
            theme: ThemeManager::new(),
        }
    }

    fn store_for(config: &Config) -> Arc<dyn KeyValueStore> {
        if config.ephemeral {
            log::info!("Using an in-memory store, the session will not survive exit");
            Arc::new(MemoryKeyValueStore::new())
        } else {
            let dir = config.data_dir();
            log::debug!("Using store in {}", dir.display());
            Arc::new(FileKeyValueStore::new(dir))
        }
    }

    /// Restore any persisted session and report where to go.
    pub async fn start(&self) -> Route {
        self.session.restore().await;
        self.route()
    }

    pub fn route(&self) -> Route {
        RoleRouter::route(&self.session.snapshot())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &Sessions {
        &self.session
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use campus_core::{Destination, Palette, Role, User};
    use session_manager::{AuthError, LoginResponse};

    struct StaticAuth(serde_json::Value);

    #[async_trait]
    impl AuthService for StaticAuth {
        async fn login(
            &self,
            _email: &str,
            _password: &str,
            _role: Role,
        ) -> Result<LoginResponse, AuthError> {
            let user: User = serde_json::from_value(self.0.clone())
                .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
            Ok(LoginResponse {
                token: Some("ctx-token".to_string()),
                user: Some(user),
            })
        }

        async fn logout(&self, _token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn admin_json() -> serde_json::Value {
        serde_json::json!({
            "id": "adm-3",
            "email": "ops@campus.edu",
            "name": "Ops",
            "createdAt": "2020-05-05",
            "role": "admin",
            "college": "North Campus",
            "permissions": ["approve_rewards"]
        })
    }

    fn file_context(dir: &std::path::Path) -> AppContext {
        let config = Config {
            data_dir: Some(dir.to_path_buf()),
            ..Config::default()
        };
        let store = AppContext::store_for(&config);
        AppContext::with_services(config, store, Arc::new(StaticAuth(admin_json())))
    }

    #[tokio::test]
    async fn test_start_routes_to_login_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let context = file_context(dir.path());

        assert_eq!(context.route(), Route::Splash);
        assert_eq!(
            context.start().await,
            Route::Ready(Destination::LoginScreen)
        );
    }

    #[tokio::test]
    async fn test_login_then_restart_routes_home() {
        let dir = tempfile::tempdir().unwrap();
        {
            let context = file_context(dir.path());
            context.start().await;
            assert!(
                context
                    .session()
                    .login("ops@campus.edu", "pw", Role::Admin)
                    .await
            );
            assert_eq!(context.route(), Route::Ready(Destination::AdminHome));
        }

        let context = file_context(dir.path());
        assert_eq!(context.start().await, Route::Ready(Destination::AdminHome));
        assert_eq!(context.snapshot().token(), Some("ctx-token"));

        context.session().logout().await;
        assert_eq!(context.route(), Route::Ready(Destination::LoginScreen));
    }

    #[tokio::test]
    async fn test_ephemeral_config_keeps_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ephemeral: true,
            ..Config::default()
        };
        let store = AppContext::store_for(&config);
        let context = AppContext::with_services(config, store, Arc::new(StaticAuth(admin_json())));
        context.start().await;
        assert!(
            context
                .session()
                .login("ops@campus.edu", "pw", Role::Admin)
                .await
        );

        assert!(!dir.path().join(FileKeyValueStore::FILE_NAME).exists());
    }

    #[test]
    fn test_each_context_has_its_own_theme() {
        let dir = tempfile::tempdir().unwrap();
        let first = file_context(dir.path());
        let second = file_context(dir.path());

        first.theme().toggle();

        assert_eq!(first.theme().palette(), Palette::Dark);
        assert_eq!(second.theme().palette(), Palette::Light);
        assert!(first.config().data_dir.is_some());
    }
}
