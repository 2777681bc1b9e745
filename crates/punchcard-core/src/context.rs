//! Wiring for one signed-in client.
//!
//! `AppContext` owns the durable storage, API client, session store and
//! navigator, plus the watcher task that reacts to 401 responses. Every
//! piece is reachable from here; nothing is global.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, TransportEvent};
use crate::auth::{FileStorage, LocalStorage, SessionStore, SessionWatcher};
use crate::config::Config;
use crate::router::{Navigation, NavigationError, Navigator};

pub struct AppContext {
    api: ApiClient,
    store: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    pending_events: Option<broadcast::Receiver<TransportEvent>>,
    watcher: Option<JoinHandle<()>>,
}

impl AppContext {
    /// Build a context backed by file storage in the configured data directory
    pub fn new(config: &Config) -> Result<Self> {
        let storage = Arc::new(FileStorage::in_dir(config.data_dir()?));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: &Config, storage: Arc<dyn LocalStorage>) -> Result<Self> {
        let api = ApiClient::with_timeout(&config.api_base_url, storage, config.request_timeout())
            .context("Failed to create API client")?;
        // Subscribe before any request can be made so no 401 is missed
        let pending_events = Some(api.subscribe());
        let store = SessionStore::restore(api.clone()).context("Failed to restore session")?;

        Ok(Self {
            api,
            store: Arc::new(store),
            navigator: Arc::new(Navigator::new()),
            pending_events,
            watcher: None,
        })
    }

    /// Start the session watcher on the current tokio runtime. Idempotent.
    pub fn start_watcher(&mut self) {
        if let Some(events) = self.pending_events.take() {
            let watcher = SessionWatcher::new(self.store.clone(), self.navigator.clone());
            self.watcher = Some(watcher.spawn(events));
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Navigate with the session as it is right now
    pub fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        self.navigator.navigate(path, &self.store.snapshot())
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}
