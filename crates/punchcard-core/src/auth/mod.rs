//! Authentication module: session state and everything that mutates it.
//!
//! This module provides:
//! - `Session`: the signed-in user, bearer token, loading and error flags
//! - `SessionStore`: login/register/logout/profile actions over the API
//! - `LocalStorage`: durable storage for the `token` and `user` entries
//! - `SessionWatcher`: signs the user out when the backend answers 401
//! - `CredentialStore`: optional OS keychain storage for passwords

pub mod credentials;
pub mod session;
pub mod storage;
pub mod store;
pub mod watcher;

pub use credentials::CredentialStore;
pub use session::Session;
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError, TOKEN_KEY, USER_KEY};
pub use store::{SessionStore, StoreError};
pub use watcher::SessionWatcher;
