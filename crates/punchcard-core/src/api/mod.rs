//! REST API client module for the attendance backend.
//!
//! This module provides the `ApiClient` plus one accessor per business
//! domain (`auth`, `attendance`, `leave`, `expense`, `diary`, `outing`,
//! `schedule`, `admin`). Each accessor method maps one-to-one onto a backend
//! endpoint and returns the decoded JSON as-is.
//!
//! Requests carry the bearer token found in durable storage; 401 responses
//! are announced as `TransportEvent::Unauthorized`.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod client;
pub mod diary;
pub mod error;
pub mod expense;
pub mod leave;
pub mod outing;
pub mod schedule;

pub use client::{ApiClient, TransportEvent, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
