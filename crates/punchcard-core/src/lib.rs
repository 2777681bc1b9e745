//! Punchcard core: the client layer of an employee attendance and HR system.
//!
//! - [`api`]: REST wrappers for every backend endpoint, with bearer-token
//!   injection and 401 announcements
//! - [`auth`]: session state, durable storage, the session store and the
//!   watcher that signs users out when the backend rejects them
//! - [`router`]: route table, navigation guard and navigator
//! - [`context`]: wires the pieces above into one owned `AppContext`

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod models;
pub mod router;
pub mod utils;

pub use api::{ApiClient, ApiError, TransportEvent};
pub use auth::{Session, SessionStore, StoreError};
pub use config::Config;
pub use context::AppContext;
pub use router::{GuardDecision, Navigation, Navigator};
