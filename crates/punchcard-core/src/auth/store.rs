//! The session store: the one owner of session state.
//!
//! Network-backed actions run one at a time, in call order. `logout` and
//! `expire_session` never wait for them; they advance the session epoch
//! instead, and an action that started under an older epoch drops its
//! result with `StoreError::Superseded`.
//!
//! Token and user only change through `commit`, which writes durable
//! storage before the new state becomes visible in memory.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::session::Session;
use super::storage::{LocalStorage, StorageError};
use crate::api::{ApiClient, ApiError};
use crate::models::{
    Credentials, LoginResponse, PasswordChange, ProfileResponse, ProfileUpdate, Registration,
    RegistrationResponse, Resource, User,
};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_UPDATE_FAILED: &str = "Profile update failed";
const PASSWORD_CHANGE_FAILED: &str = "Password change failed";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Session changed while the request was in flight")]
    Superseded,
}

impl StoreError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            StoreError::Api(e) => Some(e),
            _ => None,
        }
    }
}

pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn LocalStorage>,
    state: RwLock<Session>,
    actions: Mutex<()>,
    epoch: AtomicU64,
}

impl SessionStore {
    /// Load the persisted session and bind it to the client's storage
    pub fn restore(api: ApiClient) -> Result<Self, StorageError> {
        let storage = api.storage().clone();
        let session = Session::load(storage.as_ref())?;
        debug!(authenticated = session.is_authenticated(), "Session restored");

        Ok(Self {
            api,
            storage,
            state: RwLock::new(session),
            actions: Mutex::new(()),
            epoch: AtomicU64::new(0),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Derived queries =====

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn user_role(&self) -> String {
        self.read().user_role().to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.read().is_admin()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    // ===== Commit =====

    /// Persist `next`, then publish it. On a failed write the previous
    /// credentials are written back so storage matches memory again.
    fn publish(&self, state: &mut Session, next: Session) -> Result<(), StorageError> {
        if let Err(e) = next.save(self.storage.as_ref()) {
            if let Err(rollback) = state.save(self.storage.as_ref()) {
                error!(error = %rollback, "Failed to roll back session storage");
            }
            return Err(e);
        }
        *state = next;
        Ok(())
    }

    /// Apply a token/user transition produced by an action started at `epoch`
    fn commit(&self, epoch: u64, apply: impl FnOnce(&mut Session)) -> Result<(), StoreError> {
        let mut state = self.write();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("Dropping result of superseded action");
            return Err(StoreError::Superseded);
        }

        let mut next = state.clone();
        apply(&mut next);
        if next.same_credentials(&state) {
            *state = next;
            return Ok(());
        }
        self.publish(&mut state, next)?;
        Ok(())
    }

    /// Mark an action as running and hand back the epoch it runs under
    fn begin(&self, clear_error: bool) -> u64 {
        let mut state = self.write();
        state.loading = true;
        if clear_error {
            state.error = None;
        }
        self.epoch.load(Ordering::SeqCst)
    }

    /// Clear the loading flag and record the failure message, if any
    fn finish<T>(&self, result: Result<T, StoreError>, fallback: &str) -> Result<T, StoreError> {
        let mut state = self.write();
        state.loading = false;
        if let Err(ref e) = result {
            match e {
                StoreError::Superseded => {}
                StoreError::Api(api) => {
                    state.error = Some(api.user_message(fallback).to_string());
                }
                StoreError::Storage(_) => {
                    state.error = Some(fallback.to_string());
                }
            }
            warn!(error = %e, "Session action failed");
        }
        result
    }

    // ===== Actions =====

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, StoreError> {
        let _turn = self.actions.lock().await;
        let epoch = self.begin(true);
        let result = self.login_inner(credentials, epoch).await;
        self.finish(result, LOGIN_FAILED)
    }

    async fn login_inner(&self, credentials: &Credentials, epoch: u64) -> Result<LoginResponse, StoreError> {
        let response = self.api.auth().login(credentials).await?;
        self.commit(epoch, |s| {
            s.token = Some(response.access_token.clone());
            s.user = Some(response.user.clone());
        })?;
        info!(username = %response.user.username, role = response.user.role(), "Signed in");
        Ok(response)
    }

    /// Create an account; does not sign in
    pub async fn register(&self, registration: &Registration) -> Result<RegistrationResponse, StoreError> {
        let _turn = self.actions.lock().await;
        self.begin(true);
        let result = self
            .api
            .auth()
            .register(registration)
            .await
            .map_err(StoreError::from);
        self.finish(result, REGISTRATION_FAILED)
    }

    /// Forget token, user and error. No network call; safe to repeat.
    pub fn logout(&self) -> Result<(), StoreError> {
        let mut state = self.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let next = Session {
            user: None,
            token: None,
            error: None,
            loading: state.loading,
        };
        self.publish(&mut state, next)?;
        debug!("Signed out");
        Ok(())
    }

    /// Drop the credentials after the backend rejected `token_used`.
    ///
    /// Returns `false` without touching anything when the session has moved
    /// on to a different token since that request was sent, and `true`
    /// without touching anything when there is no session left to drop. The
    /// error field is kept so a failed login still reports why.
    pub fn expire_session(&self, token_used: Option<&str>) -> Result<bool, StoreError> {
        let mut state = self.write();
        if state.token.as_deref() != token_used {
            return Ok(false);
        }
        if state.token.is_none() && state.user.is_none() {
            // Already signed out; a sign-in started since must still commit
            return Ok(true);
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let mut next = state.clone();
        next.token = None;
        next.user = None;
        self.publish(&mut state, next)?;
        info!("Session expired by backend");
        Ok(true)
    }

    pub async fn fetch_profile(&self) -> Result<ProfileResponse, StoreError> {
        let _turn = self.actions.lock().await;
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.fetch_profile_inner(epoch).await
    }

    async fn fetch_profile_inner(&self, epoch: u64) -> Result<ProfileResponse, StoreError> {
        let response = match self.api.auth().profile().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to fetch profile");
                return Err(e.into());
            }
        };
        self.commit(epoch, |s| s.user = Some(response.user.clone()))?;
        Ok(response)
    }

    /// Submit profile changes, then refresh the cached user
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Resource, StoreError> {
        let _turn = self.actions.lock().await;
        let epoch = self.begin(false);
        let result = self.update_profile_inner(update, epoch).await;
        self.finish(result, PROFILE_UPDATE_FAILED)
    }

    async fn update_profile_inner(&self, update: &ProfileUpdate, epoch: u64) -> Result<Resource, StoreError> {
        let response = self.api.auth().update_profile(update).await?;
        self.fetch_profile_inner(epoch).await?;
        Ok(response)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Resource, StoreError> {
        let _turn = self.actions.lock().await;
        self.begin(false);
        let result = self
            .api
            .auth()
            .change_password(change)
            .await
            .map_err(StoreError::from);
        self.finish(result, PASSWORD_CHANGE_FAILED)
    }
}
