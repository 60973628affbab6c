#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use portal_client::services::credential::CredentialStore;
use portal_client::services::storage::MemoryStorage;

pub const USERNAME: &str = "testuser";
pub const PASSWORD: &str = "password123";

pub fn encode_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({ "alg": "HS256", "typ": "JWT" }).to_string());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn mint_token(role: &str, expires_at: DateTime<Utc>) -> String {
    encode_token(&json!({
        "user_id": 1,
        "role": role,
        "exp": expires_at.timestamp(),
    }))
}

pub fn memory_store() -> CredentialStore {
    CredentialStore::new(Arc::new(MemoryStorage::new()))
}

fn echo_headers(headers: &HeaderMap) -> Value {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    json!({
        "authorization": header("authorization"),
        "request_id": header("x-request-id"),
    })
}

async fn echo(headers: HeaderMap) -> Json<Value> {
    Json(echo_headers(&headers))
}

async fn slow_echo(headers: HeaderMap) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(300)).await;
    Json(echo_headers(&headers))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({}))
}

async fn protected() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "token expired" })),
    )
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "  database unavailable \n")
}

async fn login(
    State(token): State<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Ok(Json(json!({ "access_token": token, "token_type": "bearer" })))
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid username or password" })),
        ))
    }
}

/// Start a fake backend on an ephemeral port; returns the API base address.
///
/// `login_token` is what `POST /api/auth/login` hands out for valid credentials.
pub async fn spawn_backend(login_token: String) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/echo", get(echo))
        .route("/api/slow-echo", get(slow_echo))
        .route("/api/slow", get(slow))
        .route("/api/protected", get(protected))
        .route("/api/broken", get(broken))
        .with_state(login_token);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}
