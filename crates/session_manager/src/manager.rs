//! Session Manager service

use crate::auth::{AuthService, LoginResponse};
use crate::error::{Result, SessionError};
use crate::storage::KeyValueStore;
use campus_core::{Credentials, Role, SessionSnapshot, User};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Store key holding the raw token
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Store key holding the JSON user record
pub const USER_KEY: &str = "user";
/// Keys written by earlier client versions; only ever removed
pub const LEGACY_KEYS: [&str; 4] = ["accessToken", "refreshToken", "userData", "userProfile"];

pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Session Manager - owns the signed-in user and token
///
/// Starts empty with `loading` set; call [`SessionManager::restore`] once at
/// startup. Every completed transition is published to subscribers.
pub struct SessionManager<S: KeyValueStore + ?Sized, A: AuthService + ?Sized> {
    store: Arc<S>,
    auth: Arc<A>,
    state: watch::Sender<SessionSnapshot>,
    /// Serializes session writes to the store
    commit_lock: Mutex<()>,
    /// Held for the duration of a login
    login_guard: Mutex<()>,
    /// Bumped by logout and reset; a login only commits if it is unchanged
    epoch: AtomicU64,
    /// Bounds every remote call, login and logout alike
    login_timeout: Duration,
}

impl<S: KeyValueStore + ?Sized, A: AuthService + ?Sized> SessionManager<S, A> {
    pub fn new(store: Arc<S>, auth: Arc<A>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::starting());
        Self {
            store,
            auth,
            state,
            commit_lock: Mutex::new(()),
            login_guard: Mutex::new(()),
            epoch: AtomicU64::new(0),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }

    /// Bound applied to each remote call
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Current session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified after every session transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Load a persisted session, falling back to signed out on any problem.
    pub async fn restore(&self) {
        let restored = {
            let _commit = self.commit_lock.lock().await;
            match self.read_persisted().await {
                Ok(Some(credentials)) => {
                    info!("Restored session for user {}", credentials.user.id);
                    Some(credentials)
                }
                Ok(None) => {
                    debug!("No persisted session found");
                    None
                }
                Err(e) => {
                    warn!("Failed to restore session, starting signed out: {e}");
                    None
                }
            }
        };

        self.state.send_modify(|session| {
            session.credentials = restored;
            session.loading = false;
        });
    }

    async fn read_persisted(&self) -> Result<Option<Credentials>> {
        let token = self.store.get(AUTH_TOKEN_KEY).await?;
        let raw_user = self.store.get(USER_KEY).await?;

        let (Some(token), Some(raw_user)) = (token, raw_user) else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }

        let user: User = serde_json::from_str(&raw_user)?;
        user.validate()?;
        Ok(Some(Credentials { token, user }))
    }

    /// Sign in; `true` when a session was established.
    ///
    /// Rejects immediately while another login is pending.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> bool {
        let Ok(_in_flight) = self.login_guard.try_lock() else {
            warn!("Login already in progress, ignoring request for {email}");
            return false;
        };

        let epoch = self.epoch.load(Ordering::SeqCst);
        self.state.send_modify(|session| session.loading = true);

        let outcome = self.perform_login(email, password, role, epoch).await;

        self.state
            .send_if_modified(|session| std::mem::replace(&mut session.loading, false));

        match outcome {
            Ok(()) => {
                info!("Logged in {email} as {role}");
                true
            }
            Err(e) => {
                warn!("Login failed for {email}: {e}");
                false
            }
        }
    }

    async fn perform_login(&self, email: &str, password: &str, role: Role, epoch: u64) -> Result<()> {
        let response = tokio::time::timeout(self.login_timeout, self.auth.login(email, password, role))
            .await
            .map_err(|_| SessionError::Timeout(self.login_timeout))??;
        let credentials = Self::credentials_from(response, role)?;

        let committed = {
            let _commit = self.commit_lock.lock().await;
            if self.epoch.load(Ordering::SeqCst) != epoch {
                false
            } else {
                self.persist(&credentials).await?;
                // A logout or reset may have started while the store was busy
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    self.revert_persisted().await;
                    false
                } else {
                    self.state.send_modify(|session| {
                        session.credentials = Some(credentials.clone());
                        session.loading = false;
                    });
                    true
                }
            }
        };

        if !committed {
            self.remote_logout(Some(credentials.token)).await;
            return Err(SessionError::Superseded);
        }
        Ok(())
    }

    fn credentials_from(response: LoginResponse, requested: Role) -> Result<Credentials> {
        let token = response
            .token
            .filter(|token| !token.is_empty())
            .ok_or(SessionError::MalformedResponse("missing token"))?;
        let user = response
            .user
            .ok_or(SessionError::MalformedResponse("missing user"))?;
        user.validate()?;
        match user.role() {
            Some(actual) if actual != requested => {
                Err(SessionError::RoleMismatch { requested, actual })
            }
            _ => Ok(Credentials { token, user }),
        }
    }

    async fn persist(&self, credentials: &Credentials) -> Result<()> {
        let raw_user = serde_json::to_string(&credentials.user)?;
        self.store.set(AUTH_TOKEN_KEY, &credentials.token).await?;
        if let Err(e) = self.store.set(USER_KEY, &raw_user).await {
            self.rollback_token().await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Put the token key back to what the in-memory session holds.
    async fn rollback_token(&self) {
        let previous = self.state.borrow().token().map(str::to_owned);
        let result = match previous {
            Some(token) => self.store.set(AUTH_TOKEN_KEY, &token).await,
            None => self.store.remove(AUTH_TOKEN_KEY).await,
        };
        if let Err(e) = result {
            warn!("Failed to roll back {AUTH_TOKEN_KEY} after a partial write: {e}");
        }
    }

    /// Put both session keys back to what the in-memory session holds.
    async fn revert_persisted(&self) {
        self.rollback_token().await;
        let previous = self
            .state
            .borrow()
            .user()
            .map(serde_json::to_string)
            .transpose();
        let result = match previous {
            Ok(Some(raw_user)) => self.store.set(USER_KEY, &raw_user).await,
            Ok(None) => self.store.remove(USER_KEY).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!("Failed to roll back {USER_KEY} after a superseded login: {e}");
        }
    }

    /// Sign out locally, telling the server on a best-effort basis.
    ///
    /// Any login still in flight is discarded.
    pub async fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        // Waits out a login that is mid-commit, which then sees the new epoch
        let _commit = self.commit_lock.lock().await;
        let token = self.state.borrow().token().map(str::to_owned);

        let (_, failed_keys) = tokio::join!(self.remote_logout(token), self.purge_session_keys());
        if failed_keys > 0 {
            warn!("Logout left {failed_keys} key(s) in the store");
        }

        self.state.send_modify(|session| session.credentials = None);
        info!("Logged out");
    }

    async fn remote_logout(&self, token: Option<String>) {
        let Some(token) = token else {
            debug!("No token held, skipping remote logout");
            return;
        };
        match tokio::time::timeout(self.login_timeout, self.auth.logout(&token)).await {
            Ok(Ok(())) => debug!("Remote logout succeeded"),
            Ok(Err(e)) => warn!("Remote logout failed, clearing local session anyway: {e}"),
            Err(_) => warn!("Remote logout timed out after {:?}", self.login_timeout),
        }
    }

    /// Remove the session keys and every legacy alias, returning the failure count.
    ///
    /// Caller holds `commit_lock`.
    async fn purge_session_keys(&self) -> usize {
        let mut failures = 0;
        for key in [AUTH_TOKEN_KEY, USER_KEY].into_iter().chain(LEGACY_KEYS) {
            if let Err(e) = self.store.remove(key).await {
                warn!("Failed to remove {key} from store: {e}");
                failures += 1;
            }
        }
        failures
    }

    /// Wipe the whole store and sign out.
    pub async fn clear_all_data(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let _commit = self.commit_lock.lock().await;
        if let Err(e) = self.store.clear().await {
            error!("Failed to clear persistent store: {e}");
        }
        self.state.send_modify(|session| session.credentials = None);
        info!("Cleared all local data");
    }

    /// Replace the signed-in user's record, e.g. after a points change.
    pub async fn update_user(&self, user: User) -> Result<()> {
        user.validate()?;
        let _commit = self.commit_lock.lock().await;

        let current = self.state.borrow().user().map(|u| u.id.clone());
        match current {
            None => return Err(SessionError::NotAuthenticated),
            Some(current) if current != user.id => {
                return Err(SessionError::UserMismatch {
                    current,
                    given: user.id,
                })
            }
            Some(_) => {}
        }

        let raw_user = serde_json::to_string(&user)?;
        self.store.set(USER_KEY, &raw_user).await?;
        self.state.send_modify(|session| {
            if let Some(credentials) = session.credentials.as_mut() {
                credentials.user = user;
            }
        });
        Ok(())
    }
}
