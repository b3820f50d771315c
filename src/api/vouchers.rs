use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;
use crate::voucher;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    count: u32,
    #[serde(default)]
    template: Map<String, Value>,
}

pub async fn list(Extension(state): Extension<SharedState>) -> ApiResponse {
    match list_vouchers(&state.store).await {
        Ok(vouchers) => api::ok(Value::Array(vouchers)),
        Err(e) => api::internal_error("Error fetching vouchers", e),
    }
}

pub async fn generate(Extension(state): Extension<SharedState>, Json(req): Json<GenerateRequest>) -> ApiResponse {
    match voucher::create_vouchers(&state.store, req.count, &req.template).await {
        Ok(vouchers) => (StatusCode::OK, Json(json!({ "success": true, "vouchers": vouchers }))),
        Err(e) => api::internal_error("Error generating vouchers", e),
    }
}

pub async fn remove(Path(id): Path<String>, Extension(state): Extension<SharedState>) -> ApiResponse {
    match state.store.delete(id.as_str()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => api::internal_error("Error deleting voucher", e),
    }
}

pub async fn list_vouchers(store: &BoxStore) -> Result<Vec<Value>> {
    store.get_by_prefix(keys::VOUCHER_PREFIX).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::store_mem::MemStore;

    #[tokio::test]
    async fn test_generated_vouchers_show_up_in_listing() {
        let store: BoxStore = Box::new(MemStore::new());

        let mut template = Map::new();
        template.insert("profile".to_string(), json!("1Hour"));

        let generated = voucher::create_vouchers(&store, 3, &template).await.unwrap();
        let listed = list_vouchers(&store).await.unwrap();

        assert_eq!(3, listed.len());
        for v in generated.iter() {
            assert!(listed.contains(v));
        }
    }
}
