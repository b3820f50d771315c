use anyhow::Result;
use serde_json::Value;

use axum::extract::Extension;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

/// Live connection records are written by an external collector under
/// `hotspot-session:`, this endpoint only reads them back.
pub async fn active_users(Extension(state): Extension<SharedState>) -> ApiResponse {
    match list_active_users(&state.store).await {
        Ok(sessions) => api::ok(Value::Array(sessions)),
        Err(e) => api::internal_error("Error fetching active users", e),
    }
}

pub async fn list_active_users(store: &BoxStore) -> Result<Vec<Value>> {
    store.get_by_prefix(keys::HOTSPOT_SESSION_PREFIX).await
}
