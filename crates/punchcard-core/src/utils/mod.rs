//! Utility functions for rendering backend values.

pub mod format;

pub use format::{format_date, format_datetime, format_time};
