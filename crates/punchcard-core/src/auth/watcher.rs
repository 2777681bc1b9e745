//! The subscriber that owns the unauthorized-response policy.
//!
//! The transport only announces 401s. This task reacts to them: it drops
//! the rejected credentials and sends the navigator to the sign-in page.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::{SessionStore, StoreError};
use crate::api::TransportEvent;
use crate::router::Navigator;

pub struct SessionWatcher {
    store: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl SessionWatcher {
    pub fn new(store: Arc<SessionStore>, navigator: Arc<Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Apply the policy for a single event.
    /// Returns `true` when the session was dropped and the user sent to sign in.
    pub fn handle(&self, event: &TransportEvent) -> Result<bool, StoreError> {
        match event {
            TransportEvent::Unauthorized { token } => {
                let expired = match self.store.expire_session(token.as_deref()) {
                    Ok(expired) => expired,
                    Err(e) => {
                        // Storage refused the change; the user still goes to sign in
                        self.navigator.force_login();
                        return Err(e);
                    }
                };
                if !expired {
                    debug!("Ignoring 401 for a token that is no longer current");
                    return Ok(false);
                }
                let location = self.navigator.force_login();
                info!(location = location, "Backend rejected the session, signing out");
                Ok(true)
            }
        }
    }

    pub async fn run(self, mut events: broadcast::Receiver<TransportEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event) {
                        warn!(error = %e, "Failed to apply transport event");
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed = missed, "Session watcher fell behind transport events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Session watcher stopped");
    }

    /// Run on the current tokio runtime until the event channel closes
    pub fn spawn(self, events: broadcast::Receiver<TransportEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
