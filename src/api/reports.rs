use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;

use axum::extract::Extension;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

pub async fn logs(Extension(state): Extension<SharedState>) -> ApiResponse {
    match list_logs(&state.store).await {
        Ok(logs) => api::ok(Value::Array(logs)),
        Err(e) => api::internal_error("Error fetching logs", e),
    }
}

pub async fn traffic(Extension(state): Extension<SharedState>) -> ApiResponse {
    match state.store.get_by_prefix(keys::TRAFFIC_PREFIX).await {
        Ok(samples) => api::ok(Value::Array(samples)),
        Err(e) => api::internal_error("Error fetching traffic data", e),
    }
}

/// Audit log entries, newest first. Records with a missing or unparsable
/// timestamp sort last.
pub async fn list_logs(store: &BoxStore) -> Result<Vec<Value>> {
    let mut logs = store.get_by_prefix(keys::LOG_PREFIX).await?;

    logs.sort_by(|a, b| log_timestamp(b).cmp(&log_timestamp(a)));

    Ok(logs)
}

fn log_timestamp(log: &Value) -> DateTime<Utc> {
    log.get("timestamp")
        .and_then(|t| t.as_str())
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::store_mem::MemStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_logs_sorted_newest_first() {
        let store: BoxStore = Box::new(MemStore::new());

        store.set("log:a", &json!({"timestamp": "2026-08-01T10:00:00+00:00", "type": "auth", "message": "older"})).await.unwrap();
        store.set("log:b", &json!({"timestamp": "2026-08-02T10:00:00+00:00", "type": "auth", "message": "newer"})).await.unwrap();
        store.set("log:c", &json!({"type": "auth", "message": "no timestamp"})).await.unwrap();

        let logs = list_logs(&store).await.unwrap();

        assert_eq!(json!("newer"), logs[0]["message"]);
        assert_eq!(json!("older"), logs[1]["message"]);
        assert_eq!(json!("no timestamp"), logs[2]["message"]);
    }
}
