//! Data models for the attendance backend.
//!
//! Only the records this layer interprets are typed:
//!
//! - `User`: the signed-in employee, persisted with the session
//! - Auth payloads: `Credentials`, `Registration`, `LoginResponse`, etc.
//! - `ListQuery`: query parameters shared by the list/statistics endpoints
//!
//! Every other backend record (attendance, leave, expense, diary, outing,
//! schedule, setting) is passed through untouched as a `Resource`.

pub mod auth;
pub mod query;
pub mod user;

pub use auth::{
    Credentials, LoginResponse, PasswordChange, ProfileResponse, ProfileUpdate, Registration,
    RegistrationResponse,
};
pub use query::ListQuery;
pub use user::{User, ADMIN_ROLE, DEFAULT_ROLE};

/// An opaque backend record, passed through without validation
pub type Resource = serde_json::Value;
