use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized{}", detail(.0))]
    Unauthorized(Option<String>),

    #[error("Access denied{}", detail(.0))]
    AccessDenied(Option<String>),

    #[error("Resource not found{}", detail(.0))]
    NotFound(Option<String>),

    #[error("Conflict{}", detail(.0))]
    Conflict(Option<String>),

    #[error("Bad request{}", detail(.0))]
    BadRequest(Option<String>),

    #[error("Rate limited - please wait before retrying{}", detail(.0))]
    RateLimited(Option<String>),

    #[error("Server error{}", detail(.0))]
    ServerError(Option<String>),

    #[error("Request rejected with status {status}{}", detail(.message))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Stored token cannot be sent as a header")]
    InvalidToken,
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Error body shape the backend uses for every failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull the backend's `error` field out of a JSON error body
    fn backend_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::backend_message(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            429 => ApiError::RateLimited(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::Rejected { status, message },
        }
    }

    /// The message the backend supplied for this failure, if any.
    ///
    /// Transport failures and bodies without an `error` field yield `None`;
    /// callers fall back to their own generic text.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::BadRequest(m)
            | ApiError::RateLimited(m)
            | ApiError::ServerError(m) => m.as_deref(),
            ApiError::Rejected { message, .. } => message.as_deref(),
            ApiError::NetworkError(_)
            | ApiError::InvalidResponse(_)
            | ApiError::InvalidToken => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Message to surface to the user, preferring the backend's own text
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message().unwrap_or(fallback)
    }
}
