use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

pub async fn list(Extension(state): Extension<SharedState>) -> ApiResponse {
    match list_routers(&state.store).await {
        Ok(routers) => api::ok(Value::Array(routers)),
        Err(e) => api::internal_error("Error fetching routers", e),
    }
}

pub async fn create(Extension(state): Extension<SharedState>, Json(payload): Json<Value>) -> ApiResponse {
    match create_router(&state.store, &payload).await {
        Ok(id) => (StatusCode::OK, Json(json!({ "success": true, "id": id }))),
        Err(e) => api::internal_error("Error adding router", e),
    }
}

pub async fn update(Path(id): Path<String>, Extension(state): Extension<SharedState>, Json(updates): Json<Value>) -> ApiResponse {
    match api::update_record(&state.store, id.as_str(), &updates).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "success": true }))),
        Ok(false) => api::fail(StatusCode::NOT_FOUND, "Router not found"),
        Err(e) => api::internal_error("Error updating router", e),
    }
}

pub async fn remove(Path(id): Path<String>, Extension(state): Extension<SharedState>) -> ApiResponse {
    match delete_router(&state.store, id.as_str()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => api::internal_error("Error deleting router", e),
    }
}

pub async fn list_routers(store: &BoxStore) -> Result<Vec<Value>> {
    store.get_by_prefix(keys::ROUTER_PREFIX).await
}

/// New routers always start offline, the caller cannot override the
/// server-assigned fields.
pub async fn create_router(store: &BoxStore, payload: &Value) -> Result<String> {
    let id = keys::router_key();

    let mut doc = payload.as_object().cloned().unwrap_or_default();
    doc.insert("id".to_string(), json!(id));
    doc.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
    doc.insert("status".to_string(), json!("offline"));

    store.set(id.as_str(), &Value::Object(doc)).await?;

    Ok(id)
}

/// Unconditional delete, succeeds even if the id never existed.
pub async fn delete_router(store: &BoxStore, id: &str) -> Result<()> {
    store.delete(id).await
}
