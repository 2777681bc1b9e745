//! API client for communicating with the attendance backend.
//!
//! Every request goes through the same two interceptors: the outgoing side
//! attaches the stored bearer token, the incoming side announces 401
//! responses on the client's event channel before handing the error back.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::storage::{LocalStorage, TOKEN_KEY};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the backend when nothing is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Events buffered per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Something the transport observed that other components react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The backend answered 401. `token` is the credential the rejected
    /// request carried, `None` when it was sent without one.
    Unauthorized { token: Option<String> },
}

/// A request with the auth interceptor already applied
pub(crate) struct PreparedRequest {
    pub(crate) builder: RequestBuilder,
    pub(crate) token: Option<String>,
}

/// API client for the attendance backend.
/// Clone is cheap - reqwest::Client and the event sender are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: Arc<dyn LocalStorage>,
    events: broadcast::Sender<TransportEvent>,
}

impl ApiClient {
    /// Create a new API client reading its token from `storage`
    pub fn new(base_url: &str, storage: Arc<dyn LocalStorage>) -> Result<Self, ApiError> {
        Self::with_timeout(
            base_url,
            storage,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: &str,
        storage: Arc<dyn LocalStorage>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            storage,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Durable storage the request interceptor reads the token from
    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        &self.storage
    }

    /// Listen for transport events such as 401 responses
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token currently held in durable storage
    fn stored_token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, sending request without it");
                None
            }
        }
    }

    fn auth_headers(token: Option<&str>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Request interceptor: start a request with the stored bearer token attached
    pub(crate) fn prepare(&self, method: Method, path: &str) -> Result<PreparedRequest, ApiError> {
        let token = self.stored_token();
        let builder = self
            .client
            .request(method, self.url(path))
            .headers(Self::auth_headers(token.as_deref())?);
        Ok(PreparedRequest { builder, token })
    }

    /// Response interceptor: announce 401s, turn every failure status into an error
    async fn check_response(&self, response: Response, token: Option<String>) -> Result<Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %ApiError::truncate_body(&body), "Request failed");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // No subscribers is fine; nobody owns the policy yet
            if self.events.send(TransportEvent::Unauthorized { token }).is_err() {
                debug!("Unauthorized response with no event subscribers");
            }
        }

        Err(ApiError::from_status(status, &body))
    }

    async fn send<T: DeserializeOwned>(&self, prepared: PreparedRequest, path: &str) -> Result<T, ApiError> {
        let PreparedRequest { builder, token } = prepared;
        let response = builder.send().await?;
        debug!(path = path, status = %response.status(), "Response received");

        let response = self.check_response(response, token).await?;
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };

        serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    // ===== HTTP verbs =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let prepared = self.prepare(Method::GET, path)?;
        self.send(prepared, path).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let mut prepared = self.prepare(Method::GET, path)?;
        prepared.builder = prepared.builder.query(query);
        self.send(prepared, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut prepared = self.prepare(Method::POST, path)?;
        prepared.builder = prepared.builder.json(body);
        self.send(prepared, path).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let prepared = self.prepare(Method::POST, path)?;
        self.send(prepared, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut prepared = self.prepare(Method::PUT, path)?;
        prepared.builder = prepared.builder.json(body);
        self.send(prepared, path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let prepared = self.prepare(Method::DELETE, path)?;
        self.send(prepared, path).await
    }

    /// Backend liveness probe
    pub async fn health(&self) -> Result<crate::models::Resource, ApiError> {
        self.get("/health").await
    }
}
