use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use axum::extract::{Extension, Json};
use axum::http::{HeaderMap, StatusCode};

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

pub async fn login(Extension(state): Extension<SharedState>, Json(req): Json<LoginRequest>) -> ApiResponse {
    if req.username != state.admin.username || req.password != state.admin.password {
        return api::fail(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }

    match open_session(&state.store, req.username.as_str()).await {
        Ok(token) => (StatusCode::OK, Json(json!({ "success": true, "token": token, "username": req.username }))),
        Err(e) => api::internal_error("Error during login", e),
    }
}

pub async fn verify(Extension(state): Extension<SharedState>, headers: HeaderMap) -> ApiResponse {
    let token = match api::bearer_token(&headers) {
        Some(t) => t,
        None => return api::fail(StatusCode::UNAUTHORIZED, "No token"),
    };

    match verify_session(&state.store, token.as_str()).await {
        Ok(Some(username)) => (StatusCode::OK, Json(json!({ "success": true, "username": username }))),
        Ok(None) => api::fail(StatusCode::UNAUTHORIZED, "Session expired"),
        Err(e) => api::internal_error("Error verifying session", e),
    }
}

pub async fn logout(Extension(state): Extension<SharedState>, headers: HeaderMap) -> ApiResponse {
    if let Some(token) = api::bearer_token(&headers) {
        if let Err(e) = state.store.delete(keys::session_key(token.as_str()).as_str()).await {
            return api::internal_error("Error during logout", e);
        }
    }

    (StatusCode::OK, Json(json!({ "success": true })))
}

/// Mint a bearer token and store the session record with a 24h expiry.
/// Expired records are not cleaned up, the reader checks `expiresAt`.
pub async fn open_session(store: &BoxStore, username: &str) -> Result<String> {
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();

    store.set(keys::session_key(token.as_str()).as_str(), &json!({
        "username": username,
        "createdAt": now.to_rfc3339(),
        "expiresAt": (now + Duration::hours(SESSION_TTL_HOURS)).to_rfc3339(),
    })).await?;

    store.set(keys::log_key().as_str(), &json!({
        "timestamp": now.to_rfc3339(),
        "type": "auth",
        "message": "Admin login successful",
        "username": username,
    })).await?;

    Ok(token)
}

/// Some(username) while the session exists and `now < expiresAt`.
pub async fn verify_session(store: &BoxStore, token: &str) -> Result<Option<String>> {
    let session = match store.get(keys::session_key(token).as_str()).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    let expires_at = session.get("expiresAt").and_then(|v| v.as_str()).unwrap_or("");
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(t) if t.with_timezone(&Utc) > Utc::now() => {},
        _ => return Ok(None),
    }

    Ok(session.get("username").and_then(|v| v.as_str()).map(|u| u.to_string()))
}
