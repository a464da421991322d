//! End to end: SessionController over HttpAuthGateway against an axum
//! server that enforces the real cookie, bearer and anti-forgery rules.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use latchkey::prelude::*;
use latchkey_protocol::paths;
use latchkey_request::parse_cookie;
use parking_lot::Mutex;
use serde_json::{Value, json};

// =========================================================================
// Test server
// =========================================================================

const SESSION: &str = "long-lived";
const CSRF: &str = "anti-forgery";

#[derive(Default)]
struct Server {
    minted: AtomicUsize,
    live_tokens: Mutex<HashSet<String>>,
    session_open: Mutex<bool>,
}

impl Server {
    fn mint(&self) -> String {
        let token = format!("tok-{}", self.minted.fetch_add(1, Ordering::SeqCst) + 1);
        self.live_tokens.lock().insert(token.clone());
        token
    }

    fn bearer_ok(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|t| self.live_tokens.lock().contains(t))
    }
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_cookie(v, name))
}

fn csrf_ok(headers: &HeaderMap) -> bool {
    let echoed = headers.get("x-csrf-token").and_then(|v| v.to_str().ok());
    echoed.is_some() && echoed == cookie(headers, "csrf_token").as_deref()
}

fn deny(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn ada() -> Value {
    json!({
        "id": 1,
        "username": "ada",
        "display_name": "Ada Lovelace",
        "email": null,
        "role": "admin",
        "is_active": true,
    })
}

async fn login(State(server): State<Arc<Server>>, Json(body): Json<Value>) -> Response {
    if body["username"] != "ada" || body["password"] != "correct horse" {
        return deny(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }
    *server.session_open.lock() = true;
    (
        AppendHeaders([
            (header::SET_COOKIE, format!("refresh={SESSION}; HttpOnly; Path=/")),
            (header::SET_COOKIE, format!("csrf_token={CSRF}; Path=/")),
        ]),
        Json(json!({
            "access_token": server.mint(),
            "token_type": "bearer",
            "expires_in": 900,
            "user": ada(),
            "csrf_token": CSRF,
        })),
    )
        .into_response()
}

async fn refresh(State(server): State<Arc<Server>>, headers: HeaderMap) -> Response {
    let open = *server.session_open.lock();
    if !open || cookie(&headers, "refresh").as_deref() != Some(SESSION) {
        return deny(StatusCode::UNAUTHORIZED, "No valid session");
    }
    Json(json!({
        "access_token": server.mint(),
        "token_type": "bearer",
        "expires_in": 900,
    }))
    .into_response()
}

async fn me(State(server): State<Arc<Server>>, headers: HeaderMap) -> Response {
    if !server.bearer_ok(&headers) {
        return deny(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    Json(ada()).into_response()
}

async fn logout(State(server): State<Arc<Server>>, headers: HeaderMap) -> Response {
    if !csrf_ok(&headers) {
        return deny(StatusCode::FORBIDDEN, "CSRF token missing or invalid");
    }
    *server.session_open.lock() = false;
    server.live_tokens.lock().clear();
    (
        AppendHeaders([(header::SET_COOKIE, "refresh=; Max-Age=0; Path=/".to_string())]),
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn create_job(State(server): State<Arc<Server>>, headers: HeaderMap) -> Response {
    if !server.bearer_ok(&headers) {
        return deny(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    if !csrf_ok(&headers) {
        return deny(StatusCode::FORBIDDEN, "CSRF token missing or invalid");
    }
    (StatusCode::CREATED, Json(json!({ "id": 42 }))).into_response()
}

async fn spawn_server() -> (String, Arc<Server>) {
    let server = Arc::new(Server::default());
    let app = Router::new()
        .route(paths::LOGIN, post(login))
        .route(paths::REFRESH, post(refresh))
        .route(paths::ME, get(me))
        .route(paths::LOGOUT, post(logout))
        .route("/jobs", post(create_job))
        .with_state(Arc::clone(&server));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), server)
}

async fn connect() -> (HttpAuthGateway, Arc<Server>) {
    let (base_url, server) = spawn_server().await;
    let client = ApiClient::new(GatewayConfig::with_base_url(base_url)).unwrap();
    (HttpAuthGateway::new(Arc::new(client)), server)
}

fn controller(gateway: &HttpAuthGateway) -> SessionController<HttpAuthGateway, TokioTimer> {
    SessionController::over_http(gateway.clone(), TokioTimer, SessionConfig::default()).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_login_then_mutating_request_carries_bearer_and_csrf() {
    let (gateway, _server) = connect().await;
    let session = controller(&gateway);

    session
        .login(&LoginRequest::new("ada", "correct horse"))
        .await
        .unwrap();
    let created: Value = gateway
        .client()
        .post_json("/jobs", &json!({ "title": "Replace boiler" }))
        .await
        .unwrap();

    assert_eq!(created["id"], 42);
    assert!(session.is_renewal_armed());
}

#[tokio::test]
async fn test_mutating_request_without_session_is_rejected() {
    let (gateway, _server) = connect().await;
    let _session = controller(&gateway);

    let err = gateway
        .client()
        .post_json::<_, Value>("/jobs", &json!({}))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_wrong_password_surfaces_server_message() {
    let (gateway, _server) = connect().await;
    let session = controller(&gateway);

    let err = session
        .login(&LoginRequest::new("ada", "guess"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_bootstrap_on_first_visit_finds_no_session() {
    let (gateway, _server) = connect().await;
    let session = controller(&gateway);

    assert!(!session.bootstrap().await);
    assert!(!session.is_loading());
    assert!(!session.is_renewal_armed());
}

#[tokio::test]
async fn test_bootstrap_restores_session_from_cookie() {
    let (gateway, _server) = connect().await;
    let first = controller(&gateway);
    first
        .login(&LoginRequest::new("ada", "correct horse"))
        .await
        .unwrap();
    // Simulates a page reload: the in-memory credential is gone, the
    // cookie jar is not.
    first.shutdown();
    drop(first);
    gateway.client().pipeline().clear_bearer();

    let second = controller(&gateway);
    let restored = second.bootstrap().await;

    assert!(restored);
    assert_eq!(second.user().unwrap().username, "ada");
    assert_eq!(second.access_token().unwrap().expose(), "tok-2");
    assert_eq!(gateway.client().pipeline().interceptor_count(), 1);
}

#[tokio::test]
async fn test_logout_ends_server_session() {
    let (gateway, _server) = connect().await;
    let session = controller(&gateway);
    session
        .login(&LoginRequest::new("ada", "correct horse"))
        .await
        .unwrap();

    session.logout().await;

    assert!(!session.is_authenticated());
    assert!(!gateway.client().pipeline().has_bearer());
    let err = session.refresh_now().await.unwrap_err();
    assert!(matches!(err, SessionError::NoSession), "got {err:?}");
}
