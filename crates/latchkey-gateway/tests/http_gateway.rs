//! HttpAuthGateway against an in-process axum server.
//!
//! The server mimics the real `/auth` contract closely enough to exercise
//! the cookie jar, the bearer header and the anti-forgery round trip:
//!   - login sets an HttpOnly `session` cookie and a readable `csrf_token`
//!   - refresh accepts only the session cookie
//!   - `/auth/me` requires the bearer header
//!   - logout and change-password require `X-CSRF-Token` == cookie

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use latchkey_gateway::{ApiClient, AuthGateway, GatewayConfig, GatewayError, HttpAuthGateway};
use latchkey_protocol::{
    AccessToken, ChangePasswordRequest, LoginRequest, ProfileUpdate, UserId, paths,
};
use latchkey_request::{CookieSource, ForgeryTokenBridge, InterceptorRegistration, parse_cookie};
use serde_json::{Value, json};

// =========================================================================
// Test server
// =========================================================================

const USERNAME: &str = "ada";
const PASSWORD: &str = "correct horse";
const SESSION: &str = "s-1";
const CSRF: &str = "c-1";

#[derive(Default)]
struct Server {
    minted: AtomicUsize,
    refresh_calls: AtomicUsize,
}

fn user_json(display_name: &str) -> Value {
    json!({
        "id": 7,
        "username": USERNAME,
        "display_name": display_name,
        "email": "ada@example.com",
        "role": "admin",
        "is_active": true,
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_cookie(v, name))
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer tok-"))
}

fn csrf_ok(headers: &HeaderMap) -> bool {
    let echoed = headers.get("x-csrf-token").and_then(|v| v.to_str().ok());
    matches!((echoed, cookie(headers, "csrf_token")), (Some(h), Some(c)) if h == c)
}

async fn login(State(server): State<Arc<Server>>, Json(body): Json<Value>) -> Response {
    if body["username"] != USERNAME || body["password"] != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }
    let n = server.minted.fetch_add(1, Ordering::SeqCst) + 1;
    (
        AppendHeaders([
            (header::SET_COOKIE, format!("session={SESSION}; HttpOnly; Path=/")),
            (header::SET_COOKIE, format!("csrf_token={CSRF}; Path=/")),
        ]),
        Json(json!({
            "access_token": format!("tok-{n}"),
            "token_type": "bearer",
            "expires_in": 900,
            "user": user_json("Ada Lovelace"),
            "csrf_token": CSRF,
        })),
    )
        .into_response()
}

async fn refresh(State(server): State<Arc<Server>>, headers: HeaderMap) -> Response {
    server.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if cookie(&headers, "session").as_deref() != Some(SESSION) {
        return detail(StatusCode::UNAUTHORIZED, "No valid session");
    }
    let n = server.minted.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "access_token": format!("tok-{n}"),
        "token_type": "bearer",
        "expires_in": 900,
    }))
    .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !has_bearer(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    Json(user_json("Ada Lovelace")).into_response()
}

async fn update_me(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_bearer(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let name = body["display_name"].as_str().unwrap_or("Ada Lovelace");
    Json(user_json(name)).into_response()
}

async fn logout(headers: HeaderMap) -> Response {
    if !csrf_ok(&headers) {
        return detail(StatusCode::FORBIDDEN, "CSRF token missing or invalid");
    }
    (
        AppendHeaders([(header::SET_COOKIE, "session=; Max-Age=0; Path=/".to_string())]),
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn change_password(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !csrf_ok(&headers) {
        return detail(StatusCode::FORBIDDEN, "CSRF token missing or invalid");
    }
    if !has_bearer(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    if body["current_password"] != PASSWORD {
        return detail(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }
    Json(json!({ "message": "Password changed" })).into_response()
}

async fn boom() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response()
}

async fn spawn_server() -> (String, Arc<Server>) {
    let server = Arc::new(Server::default());
    let app = Router::new()
        .route(paths::LOGIN, post(login))
        .route(paths::REFRESH, post(refresh))
        .route(paths::ME, get(me).patch(update_me))
        .route(paths::LOGOUT, post(logout))
        .route(paths::CHANGE_PASSWORD, post(change_password))
        .route("/boom", get(boom))
        .with_state(Arc::clone(&server));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), server)
}

struct Harness {
    gateway: HttpAuthGateway,
    server: Arc<Server>,
}

impl Harness {
    async fn new() -> Self {
        let (base_url, server) = spawn_server().await;
        let client = Arc::new(ApiClient::new(GatewayConfig::with_base_url(base_url)).unwrap());
        Self {
            gateway: HttpAuthGateway::new(client),
            server,
        }
    }

    fn client(&self) -> &Arc<ApiClient> {
        self.gateway.client()
    }

    fn install_csrf(&self) -> InterceptorRegistration {
        let bridge = ForgeryTokenBridge::new(Arc::new(self.client().cookies()));
        self.client().pipeline().register(Arc::new(bridge))
    }

    async fn sign_in(&self) -> AccessToken {
        let response = self
            .gateway
            .login(&LoginRequest::new(USERNAME, PASSWORD))
            .await
            .unwrap();
        self.client().pipeline().set_bearer(&response.access_token).unwrap();
        response.access_token
    }
}

// =========================================================================
// login
// =========================================================================

#[tokio::test]
async fn test_login_returns_user_and_stores_cookies() {
    let h = Harness::new().await;

    let response = h
        .gateway
        .login(&LoginRequest::new(USERNAME, PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.access_token.expose(), "tok-1");
    assert_eq!(response.expires_in, 900);
    assert_eq!(response.user.id, UserId(7));
    assert_eq!(response.csrf_token.as_deref(), Some(CSRF));

    let cookies = h.client().cookies().cookie_header().unwrap();
    assert_eq!(parse_cookie(&cookies, "csrf_token").as_deref(), Some(CSRF));
    assert_eq!(parse_cookie(&cookies, "session").as_deref(), Some(SESSION));
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized_with_server_message() {
    let h = Harness::new().await;

    let err = h
        .gateway
        .login(&LoginRequest::new(USERNAME, "wrong"))
        .await
        .unwrap_err();

    let GatewayError::Unauthorized(message) = err else {
        panic!("expected Unauthorized, got {err:?}");
    };
    assert_eq!(message, "Invalid username or password");
    assert_eq!(h.client().cookies().cookie_header(), None);
}

// =========================================================================
// refresh
// =========================================================================

#[tokio::test]
async fn test_refresh_without_session_cookie_is_unauthorized() {
    let h = Harness::new().await;

    let err = h.gateway.refresh().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.server.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_after_login_mints_new_token() {
    let h = Harness::new().await;
    h.sign_in().await;

    let grant = h.gateway.refresh().await.unwrap().into_grant();

    assert_eq!(grant.token.expose(), "tok-2");
    assert_eq!(grant.expires_in, 900);
}

// =========================================================================
// current_user / profile
// =========================================================================

#[tokio::test]
async fn test_current_user_requires_bearer() {
    let h = Harness::new().await;
    h.gateway
        .login(&LoginRequest::new(USERNAME, PASSWORD))
        .await
        .unwrap();

    let err = h.gateway.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());

    h.sign_in().await;
    let user = h.gateway.current_user().await.unwrap();
    assert_eq!(user.username, USERNAME);
}

#[tokio::test]
async fn test_update_profile_returns_updated_user() {
    let h = Harness::new().await;
    h.sign_in().await;

    let update = ProfileUpdate {
        display_name: Some("Countess".into()),
        ..Default::default()
    };
    let user = h.gateway.update_profile(&update).await.unwrap();

    assert_eq!(user.display_name, "Countess");
}

// =========================================================================
// anti-forgery round trip
// =========================================================================

#[tokio::test]
async fn test_logout_without_csrf_bridge_is_forbidden() {
    let h = Harness::new().await;
    h.sign_in().await;

    let err = h.gateway.logout().await.unwrap_err();

    assert!(matches!(err, GatewayError::Forbidden(_)), "got {err:?}");
}

#[tokio::test]
async fn test_logout_with_csrf_bridge_succeeds_and_ends_session() {
    let h = Harness::new().await;
    let _csrf = h.install_csrf();
    h.sign_in().await;

    h.gateway.logout().await.unwrap();

    let err = h.gateway.refresh().await.unwrap_err();
    assert!(err.is_unauthorized(), "session cookie was cleared");
}

#[tokio::test]
async fn test_change_password_checks_current_password() {
    let h = Harness::new().await;
    let _csrf = h.install_csrf();
    h.sign_in().await;

    let wrong = ChangePasswordRequest {
        current_password: "nope".into(),
        new_password: "battery staple".into(),
    };
    let err = h.gateway.change_password(&wrong).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse(ref m) if m.contains("incorrect")));

    let right = ChangePasswordRequest {
        current_password: PASSWORD.into(),
        new_password: "battery staple".into(),
    };
    h.gateway.change_password(&right).await.unwrap();
}

// =========================================================================
// errors
// =========================================================================

#[tokio::test]
async fn test_server_error_body_is_surfaced() {
    let h = Harness::new().await;

    let err = h.client().delete("/boom").await.unwrap_err();

    // DELETE isn't routed for /boom, so axum answers 405.
    assert!(matches!(err, GatewayError::InvalidResponse(_)), "got {err:?}");

    let err = h.client().get_json::<Value>("/boom").await.unwrap_err();
    assert!(matches!(err, GatewayError::Server(ref m) if m == "database unavailable"));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop a listener to get a port nobody is serving.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = GatewayConfig::with_base_url(format!("http://{addr}/"));
    let client = Arc::new(ApiClient::new(config).unwrap());
    let gateway = HttpAuthGateway::new(client);

    let err = gateway.current_user().await.unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)), "got {err:?}");
}
