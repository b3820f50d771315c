pub mod analytics;
pub mod auth;
pub mod hotspot;
pub mod reports;
pub mod routers;
pub mod settings;
pub mod users;
pub mod vouchers;

use anyhow::Result;
use log::error;

use axum::extract::Json;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{json, Value};

use crate::datastore::store::BoxStore;

/// Every endpoint answers `{success, data?, error?}` plus a status code.
pub type ApiResponse = (StatusCode, Json<Value>);

pub fn ok(data: Value) -> ApiResponse {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

pub fn fail(status: StatusCode, error: &str) -> ApiResponse {
    (status, Json(json!({ "success": false, "error": error })))
}

/// Store or handler errors never crash the process, they are logged and
/// surfaced as a generic 500 with the stringified cause.
pub fn internal_error(context: &str, e: anyhow::Error) -> ApiResponse {
    error!("{}: {}", context, e);

    fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string().as_str())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers.get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.to_string())
}

/// Shallow merge of the caller's partial fields over the stored document:
/// supplied keys overwrite, all other keys are kept. Returns false when the
/// record does not exist, nothing is created in that case.
pub async fn update_record(store: &BoxStore, id: &str, updates: &Value) -> Result<bool> {
    let existing = match store.get(id).await? {
        Some(v) => v,
        None => return Ok(false),
    };

    let mut doc = existing.as_object().cloned().unwrap_or_default();
    if let Some(m) = updates.as_object() {
        for (k, v) in m.iter() {
            doc.insert(k.clone(), v.clone());
        }
    }

    store.set(id, &Value::Object(doc)).await?;

    Ok(true)
}
