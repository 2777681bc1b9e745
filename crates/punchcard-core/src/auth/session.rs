use tracing::warn;

use super::storage::{LocalStorage, StorageError, TOKEN_KEY, USER_KEY};
use crate::models::{User, ADMIN_ROLE, DEFAULT_ROLE};

/// In-memory view of the signed-in user and their credential.
///
/// Only `token` and `user` are durable; `loading` and `error` describe the
/// action currently running and start out cleared on every restore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// Rebuild the session from durable storage
    pub fn load(storage: &dyn LocalStorage) -> Result<Self, StorageError> {
        let token = storage.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = match storage.get_item(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable stored user");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            user,
            token,
            loading: false,
            error: None,
        })
    }

    /// Write token and user to durable storage, removing whichever is unset
    pub fn save(&self, storage: &dyn LocalStorage) -> Result<(), StorageError> {
        match self.user {
            Some(ref user) => storage.set_item(USER_KEY, &serde_json::to_string(user)?)?,
            None => storage.remove_item(USER_KEY)?,
        }
        match self.token {
            Some(ref token) => storage.set_item(TOKEN_KEY, token)?,
            None => storage.remove_item(TOKEN_KEY)?,
        }
        Ok(())
    }

    /// Whether the durable half of two sessions matches
    pub fn same_credentials(&self, other: &Session) -> bool {
        self.token == other.token && self.user == other.user
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_role(&self) -> &str {
        self.user.as_ref().map(User::role).unwrap_or(DEFAULT_ROLE)
    }

    pub fn is_admin(&self) -> bool {
        self.user_role() == ADMIN_ROLE
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Get the bearer token if signed in
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
