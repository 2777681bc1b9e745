//! Session store, transport interceptors and watcher against a stub backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use punchcard_core::api::{ApiError, TransportEvent};
use punchcard_core::auth::{FileStorage, LocalStorage, SessionWatcher, StoreError, TOKEN_KEY, USER_KEY};
use punchcard_core::models::{Credentials, ListQuery, PasswordChange, ProfileUpdate, Registration};
use punchcard_core::{AppContext, Config};

// =============================================================================
// Stub backend
// =============================================================================

const VALID_TOKEN: &str = "abc123";

struct StubState {
    real_name: String,
    token_valid: bool,
    last_authorization: Option<String>,
}

type Stub = Arc<Mutex<StubState>>;

fn user_json(real_name: &str) -> Value {
    json!({
        "id": 1,
        "username": "alice",
        "email": "alice@company.com",
        "real_name": real_name,
        "employee_id": "E001",
        "department": "Operations",
        "position": "Clerk",
        "phone": null,
        "role": "employee"
    })
}

fn unauthorized(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message })))
}

/// Record the Authorization header and check it against the issued token
fn authorize(stub: &Stub, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let mut state = stub.lock().unwrap();
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.last_authorization = header.clone();

    let expected = format!("Bearer {}", VALID_TOKEN);
    if state.token_valid && header.as_deref() == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(unauthorized("token expired"))
    }
}

async fn login(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if username == "slowpoke" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if (username == "alice" || username == "slowpoke") && password == "secret" {
        let mut state = stub.lock().unwrap();
        state.token_valid = true;
        let user = user_json(&state.real_name);
        return (
            StatusCode::OK,
            Json(json!({ "message": "ok", "access_token": VALID_TOKEN, "user": user })),
        );
    }
    unauthorized("invalid credentials")
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["username"] == "taken" {
        return (StatusCode::CONFLICT, Json(json!({ "error": "username exists" })));
    }
    (StatusCode::CREATED, Json(json!({ "message": "registered", "user_id": 9 })))
}

async fn profile(State(stub): State<Stub>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&stub, &headers) {
        return rejection;
    }
    let state = stub.lock().unwrap();
    let mut user = user_json(&state.real_name);
    user["is_active"] = json!(true);
    (StatusCode::OK, Json(json!({ "user": user })))
}

async fn update_profile(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&stub, &headers) {
        return rejection;
    }
    if let Some(name) = body["real_name"].as_str() {
        stub.lock().unwrap().real_name = name.to_string();
    }
    (StatusCode::OK, Json(json!({ "message": "profile updated" })))
}

async fn change_password(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&stub, &headers) {
        return rejection;
    }
    if body["new_password"].as_str().map(str::len).unwrap_or(0) < 6 {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "password too short" })));
    }
    (StatusCode::OK, Json(json!({ "message": "password changed" })))
}

async fn attendance_today(State(stub): State<Stub>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&stub, &headers) {
        return rejection;
    }
    (StatusCode::OK, Json(json!({ "record": null })))
}

async fn leave_requests(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&stub, &headers) {
        return rejection;
    }
    (StatusCode::OK, Json(json!({ "requests": [], "query": params })))
}

async fn spawn_backend() -> (String, Stub) {
    let stub: Stub = Arc::new(Mutex::new(StubState {
        real_name: "Alice".to_string(),
        token_valid: false,
        last_authorization: None,
    }));

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/profile", get(profile).put(update_profile))
        .route("/api/auth/change-password", post(change_password))
        .route("/api/attendance/today", get(attendance_today))
        .route("/api/leave/requests", get(leave_requests))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), stub)
}

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    ctx: AppContext,
    stub: Stub,
    config: Config,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let (url, stub) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        api_base_url: url,
        data_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let ctx = AppContext::new(&config).unwrap();
    Harness {
        ctx,
        stub,
        config,
        _dir: dir,
    }
}

impl Harness {
    fn disk(&self) -> FileStorage {
        FileStorage::in_dir(self.config.data_dir().unwrap())
    }

    async fn sign_in(&self) {
        self.ctx
            .store()
            .login(&Credentials::new("alice", "secret"))
            .await
            .unwrap();
    }

    fn revoke_token(&self) {
        self.stub.lock().unwrap().token_valid = false;
    }

    fn watcher(&self) -> SessionWatcher {
        SessionWatcher::new(self.ctx.store().clone(), self.ctx.navigator().clone())
    }
}

// =============================================================================
// Login / logout
// =============================================================================

#[tokio::test]
async fn login_success_persists_token_and_user() {
    let h = harness().await;
    let store = h.ctx.store();

    let response = store.login(&Credentials::new("alice", "secret")).await.unwrap();

    assert!(store.is_authenticated());
    assert_eq!(store.current_user(), Some(response.user.clone()));
    assert_eq!(store.token().as_deref(), Some(VALID_TOKEN));
    assert!(!store.is_loading());
    assert_eq!(store.error(), None);

    let disk = h.disk();
    assert_eq!(disk.get_item(TOKEN_KEY).unwrap().as_deref(), Some(VALID_TOKEN));
    let stored_user = disk.get_item(USER_KEY).unwrap().unwrap();
    assert_eq!(serde_json::from_str::<punchcard_core::models::User>(&stored_user).unwrap(), response.user);
}

#[tokio::test]
async fn login_failure_records_backend_message() {
    let h = harness().await;
    let store = h.ctx.store();
    let mut events = h.ctx.api().subscribe();

    let err = store
        .login(&Credentials::new("alice", "bad"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized(_))));
    assert_eq!(store.error().as_deref(), Some("invalid credentials"));
    assert!(!store.is_authenticated());
    assert!(!store.is_loading());

    // The 401 still goes through the watcher, which keeps the message
    let event = events.recv().await.unwrap();
    assert_eq!(event, TransportEvent::Unauthorized { token: None });
    assert!(h.watcher().handle(&event).unwrap());
    assert_eq!(h.ctx.navigator().current().as_deref(), Some("/login"));
    assert_eq!(store.error().as_deref(), Some("invalid credentials"));
}

#[tokio::test]
async fn logout_clears_everything() {
    let h = harness().await;
    h.sign_in().await;

    h.ctx.store().logout().unwrap();
    assert!(!h.ctx.store().is_authenticated());
    assert_eq!(h.ctx.store().current_user(), None);

    let disk = h.disk();
    assert_eq!(disk.get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(disk.get_item(USER_KEY).unwrap(), None);

    // Second logout changes nothing
    let before = h.ctx.store().snapshot();
    h.ctx.store().logout().unwrap();
    assert_eq!(h.ctx.store().snapshot(), before);
}

#[tokio::test]
async fn restart_restores_same_session() {
    let h = harness().await;
    h.sign_in().await;
    let before = h.ctx.store().snapshot();

    let restarted = AppContext::new(&h.config).unwrap();
    assert_eq!(restarted.store().snapshot(), before);
    assert!(restarted.store().is_authenticated());
}

// =============================================================================
// Interceptors
// =============================================================================

#[tokio::test]
async fn requests_carry_stored_bearer_token() {
    let h = harness().await;
    h.sign_in().await;

    h.ctx.api().attendance().today().await.unwrap();
    assert_eq!(
        h.stub.lock().unwrap().last_authorization.as_deref(),
        Some("Bearer abc123")
    );
}

#[tokio::test]
async fn unauthorized_from_any_call_signs_out() {
    let h = harness().await;
    h.sign_in().await;
    let mut events = h.ctx.api().subscribe();
    h.revoke_token();

    let err = h.ctx.api().leave().list(&ListQuery::default()).await.unwrap_err();
    assert!(err.is_unauthorized());

    let event = events.recv().await.unwrap();
    assert_eq!(event, TransportEvent::Unauthorized { token: Some(VALID_TOKEN.to_string()) });
    assert!(h.watcher().handle(&event).unwrap());

    assert!(!h.ctx.store().is_authenticated());
    assert_eq!(h.ctx.navigator().current().as_deref(), Some("/login"));
    let disk = h.disk();
    assert_eq!(disk.get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(disk.get_item(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn stale_unauthorized_event_keeps_new_session() {
    let h = harness().await;
    h.sign_in().await;

    let stale = TransportEvent::Unauthorized { token: Some("old-token".to_string()) };
    assert!(!h.watcher().handle(&stale).unwrap());
    assert!(h.ctx.store().is_authenticated());
    assert_eq!(h.ctx.navigator().current(), None);
}

#[tokio::test]
async fn spawned_watcher_reacts_to_unauthorized() {
    let mut h = harness().await;
    h.ctx.start_watcher();
    h.sign_in().await;
    h.revoke_token();

    assert!(h.ctx.api().attendance().today().await.is_err());

    let signed_out = async {
        while h.ctx.store().is_authenticated() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), signed_out)
        .await
        .expect("watcher did not sign out");
    assert_eq!(h.ctx.navigator().current().as_deref(), Some("/login"));
    assert_eq!(h.disk().get_item(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn list_query_is_passed_through() {
    let h = harness().await;
    h.sign_in().await;

    let query = ListQuery {
        status: Some("pending".to_string()),
        ..ListQuery::page(2)
    };
    let resp = h.ctx.api().leave().list(&query).await.unwrap();
    assert_eq!(resp["query"], json!({ "page": "2", "status": "pending" }));
}

// =============================================================================
// Profile and registration
// =============================================================================

#[tokio::test]
async fn update_profile_refreshes_cached_user() {
    let h = harness().await;
    h.sign_in().await;

    let update = ProfileUpdate {
        real_name: Some("Alice Chen".to_string()),
        ..Default::default()
    };
    h.ctx.store().update_profile(&update).await.unwrap();

    let user = h.ctx.store().current_user().unwrap();
    assert_eq!(user.real_name.as_deref(), Some("Alice Chen"));
    assert_eq!(user.is_active, Some(true));
    assert!(!h.ctx.store().is_loading());

    let stored = h.disk().get_item(USER_KEY).unwrap().unwrap();
    assert!(stored.contains("Alice Chen"));
}

#[tokio::test]
async fn fetch_profile_failure_leaves_error_field_alone() {
    let h = harness().await;

    assert!(h.ctx.store().fetch_profile().await.is_err());
    assert_eq!(h.ctx.store().error(), None);
    assert!(!h.ctx.store().is_loading());
}

#[tokio::test]
async fn change_password_surfaces_backend_message() {
    let h = harness().await;
    h.sign_in().await;

    let change = PasswordChange {
        current_password: "secret".to_string(),
        new_password: "abc".to_string(),
    };
    assert!(h.ctx.store().change_password(&change).await.is_err());
    assert_eq!(h.ctx.store().error().as_deref(), Some("password too short"));
    assert!(h.ctx.store().is_authenticated());
}

#[tokio::test]
async fn register_does_not_sign_in() {
    let h = harness().await;
    let mut registration = Registration {
        username: "bob".to_string(),
        email: "bob@company.com".to_string(),
        password: "hunter22".to_string(),
        real_name: "Bob".to_string(),
        employee_id: None,
        department: None,
        position: None,
        phone: None,
    };

    let resp = h.ctx.store().register(&registration).await.unwrap();
    assert_eq!(resp.user_id, Some(9));
    assert!(!h.ctx.store().is_authenticated());

    registration.username = "taken".to_string();
    assert!(h.ctx.store().register(&registration).await.is_err());
    assert_eq!(h.ctx.store().error().as_deref(), Some("username exists"));
    assert!(!h.ctx.store().is_loading());
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn overlapping_logins_resolve_in_call_order() {
    let h = harness().await;
    let store = h.ctx.store();
    let bad = Credentials::new("alice", "bad");
    let good = Credentials::new("alice", "secret");

    let (first, second) = tokio::join!(store.login(&bad), store.login(&good));
    assert!(first.is_err());
    assert!(second.is_ok());
    assert!(store.is_authenticated());
    assert_eq!(store.error(), None);
}

#[tokio::test(flavor = "current_thread")]
async fn correct_password_after_typo_signs_in() {
    let mut h = harness().await;
    h.ctx.start_watcher();
    let store = h.ctx.store().clone();

    assert!(store.login(&Credentials::new("alice", "bad")).await.is_err());

    // The watcher handles the rejected attempt while this one is in flight
    let retry = store.login(&Credentials::new("slowpoke", "secret")).await;
    assert!(retry.is_ok(), "retry failed: {:?}", retry.err());
    assert!(store.is_authenticated());
    assert_eq!(store.error(), None);
    assert_eq!(h.disk().get_item(TOKEN_KEY).unwrap().as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn logout_wins_over_in_flight_login() {
    let h = harness().await;
    let store = h.ctx.store();
    let slow = Credentials::new("slowpoke", "secret");

    let (result, _) = tokio::join!(store.login(&slow), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.logout().unwrap();
    });

    assert!(matches!(result, Err(StoreError::Superseded)));
    assert!(!store.is_authenticated());
    assert!(!store.is_loading());
    assert_eq!(h.disk().get_item(TOKEN_KEY).unwrap(), None);
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
async fn employee_is_kept_out_of_admin_pages() {
    let h = harness().await;
    h.sign_in().await;

    let nav = h.ctx.navigate("/admin/users").unwrap();
    assert_eq!(nav.location, "/");
    assert!(nav.redirected);

    let nav = h.ctx.navigate("/attendance/history").unwrap();
    assert_eq!(nav.location, "/attendance/history");
    assert!(!nav.redirected);
}
