use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    users: Vec<Value>,
}

pub async fn list(Extension(state): Extension<SharedState>) -> ApiResponse {
    match list_users(&state.store).await {
        Ok(users) => api::ok(Value::Array(users)),
        Err(e) => api::internal_error("Error fetching users", e),
    }
}

pub async fn create(Extension(state): Extension<SharedState>, Json(payload): Json<Value>) -> ApiResponse {
    match create_user(&state.store, &payload).await {
        Ok(id) => (StatusCode::OK, Json(json!({ "success": true, "id": id }))),
        Err(e) => api::internal_error("Error creating user", e),
    }
}

pub async fn create_bulk(Extension(state): Extension<SharedState>, Json(req): Json<BulkRequest>) -> ApiResponse {
    match create_users(&state.store, &req.users).await {
        Ok(ids) => (StatusCode::OK, Json(json!({ "success": true, "ids": ids }))),
        Err(e) => api::internal_error("Error creating bulk users", e),
    }
}

pub async fn update(Path(id): Path<String>, Extension(state): Extension<SharedState>, Json(updates): Json<Value>) -> ApiResponse {
    match api::update_record(&state.store, id.as_str(), &updates).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "success": true }))),
        Ok(false) => api::fail(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => api::internal_error("Error updating user", e),
    }
}

pub async fn remove(Path(id): Path<String>, Extension(state): Extension<SharedState>) -> ApiResponse {
    match state.store.delete(id.as_str()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => api::internal_error("Error deleting user", e),
    }
}

pub async fn list_users(store: &BoxStore) -> Result<Vec<Value>> {
    store.get_by_prefix(keys::USER_PREFIX).await
}

pub async fn create_user(store: &BoxStore, payload: &Value) -> Result<String> {
    let id = keys::user_key();

    let mut doc = payload.as_object().cloned().unwrap_or_default();
    doc.insert("id".to_string(), json!(id));
    doc.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
    doc.insert("active".to_string(), json!(true));

    store.set(id.as_str(), &Value::Object(doc)).await?;

    Ok(id)
}

/// Batch creation is not transactional. On a mid-batch failure the error
/// says how many records were already written, the caller has to reconcile.
pub async fn create_users(store: &BoxStore, users: &[Value]) -> Result<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(users.len());

    for user in users.iter() {
        match create_user(store, user).await {
            Ok(id) => ids.push(id),
            Err(e) => {
                return Err(anyhow!("{}", format!("{} of {} users created before failure: {}", ids.len(), users.len(), e)));
            },
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::store_mem::MemStore;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_create_user_defaults() {
        let store: BoxStore = Box::new(MemStore::new());

        let id = create_user(&store, &json!({
            "username": "bob",
            "password": "secret",
            "profile": "1Hour",
        })).await.unwrap();

        let doc = store.get(id.as_str()).await.unwrap().unwrap();
        assert_eq!(json!(true), doc["active"]);
        assert_eq!(json!("bob"), doc["username"]);
        assert!(doc.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_update_user_flips_only_active() {
        let store: BoxStore = Box::new(MemStore::new());

        let id = create_user(&store, &json!({"username": "bob", "password": "secret", "profile": "1Hour"})).await.unwrap();

        let updated = api::update_record(&store, id.as_str(), &json!({"active": false})).await.unwrap();
        assert!(updated);

        let doc = store.get(id.as_str()).await.unwrap().unwrap();
        assert_eq!(json!(false), doc["active"]);
        assert_eq!(json!("bob"), doc["username"]);
        assert_eq!(json!("secret"), doc["password"]);
        assert_eq!(json!("1Hour"), doc["profile"]);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let store: BoxStore = Box::new(MemStore::new());

        let updated = api::update_record(&store, "user:ghost", &json!({"active": false})).await.unwrap();

        assert!(!updated);
        assert!(list_users(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_users_bulk() {
        let store: BoxStore = Box::new(MemStore::new());

        let users = vec![
            json!({"username": "u1"}),
            json!({"username": "u2"}),
            json!({"username": "u3"}),
        ];

        let ids = create_users(&store, &users).await.unwrap();

        assert_eq!(3, ids.len());
        assert_eq!(3, ids.iter().collect::<HashSet<_>>().len());
        assert_eq!(3, list_users(&store).await.unwrap().len());
    }
}
