use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use axum::extract::{Extension, Json};
use axum::http::StatusCode;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    html: String,
}

pub async fn get_session_settings(Extension(state): Extension<SharedState>) -> ApiResponse {
    match session_settings(&state.store).await {
        Ok(settings) => api::ok(settings),
        Err(e) => api::internal_error("Error fetching session settings", e),
    }
}

pub async fn put_session_settings(Extension(state): Extension<SharedState>, Json(settings): Json<Value>) -> ApiResponse {
    match save_session_settings(&state.store, &settings).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => api::internal_error("Error saving session settings", e),
    }
}

pub async fn get_template(Extension(state): Extension<SharedState>) -> ApiResponse {
    match login_template(&state.store).await {
        Ok(template) => api::ok(template),
        Err(e) => api::internal_error("Error fetching template", e),
    }
}

pub async fn put_template(Extension(state): Extension<SharedState>, Json(req): Json<TemplateRequest>) -> ApiResponse {
    match save_login_template(&state.store, req.html.as_str()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => api::internal_error("Error saving template", e),
    }
}

/// Singleton settings blob, `{}` until the first save.
pub async fn session_settings(store: &BoxStore) -> Result<Value> {
    Ok(store.get(keys::SESSION_SETTINGS_KEY).await?.unwrap_or_else(|| json!({})))
}

pub async fn save_session_settings(store: &BoxStore, settings: &Value) -> Result<()> {
    store.set(keys::SESSION_SETTINGS_KEY, settings).await
}

/// The captive-portal login page, null until the first save.
pub async fn login_template(store: &BoxStore) -> Result<Value> {
    Ok(store.get(keys::LOGIN_TEMPLATE_KEY).await?.unwrap_or(Value::Null))
}

/// The template is stored as a single html blob stamped with its save time.
pub async fn save_login_template(store: &BoxStore, html: &str) -> Result<()> {
    let doc = json!({
        "html": html,
        "updatedAt": Utc::now().to_rfc3339(),
    });

    store.set(keys::LOGIN_TEMPLATE_KEY, &doc).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::store_mem::MemStore;

    #[tokio::test]
    async fn test_session_settings_default_and_roundtrip() {
        let store: BoxStore = Box::new(MemStore::new());

        assert_eq!(json!({}), session_settings(&store).await.unwrap());

        let settings = json!({"sessionTimeout": 60, "idleTimeout": 15, "sharedUsers": 1});
        save_session_settings(&store, &settings).await.unwrap();

        assert_eq!(settings, session_settings(&store).await.unwrap());

        // A second save replaces the whole blob
        let settings2 = json!({"sessionTimeout": 120});
        save_session_settings(&store, &settings2).await.unwrap();

        assert_eq!(settings2, session_settings(&store).await.unwrap());
    }

    #[tokio::test]
    async fn test_login_template_default_is_null() {
        let store: BoxStore = Box::new(MemStore::new());

        assert_eq!(Value::Null, login_template(&store).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_login_template_wraps_html() {
        let store: BoxStore = Box::new(MemStore::new());

        save_login_template(&store, "<html>login</html>").await.unwrap();

        let doc = login_template(&store).await.unwrap();
        assert_eq!(json!("<html>login</html>"), doc["html"]);
        assert!(doc.get("updatedAt").and_then(|t| t.as_str()).is_some());
    }
}
