use anyhow::Result;
use serde_json::{json, Value};

use axum::extract::Extension;

use crate::api::{self, ApiResponse};
use crate::datastore::store::BoxStore;
use crate::keys;
use crate::server::SharedState;

pub async fn dashboard(Extension(state): Extension<SharedState>) -> ApiResponse {
    match dashboard_stats(&state.store).await {
        Ok(stats) => api::ok(stats),
        Err(e) => api::internal_error("Error fetching analytics", e),
    }
}

pub async fn traffic(Extension(state): Extension<SharedState>) -> ApiResponse {
    match state.store.get_by_prefix(keys::TRAFFIC_PREFIX).await {
        Ok(samples) => api::ok(Value::Array(samples)),
        Err(e) => api::internal_error("Error fetching traffic data", e),
    }
}

/// Aggregate counts derived on read from the router/user/voucher scans,
/// nothing is cached.
pub async fn dashboard_stats(store: &BoxStore) -> Result<Value> {
    let routers = store.get_by_prefix(keys::ROUTER_PREFIX).await?;
    let users = store.get_by_prefix(keys::USER_PREFIX).await?;
    let vouchers = store.get_by_prefix(keys::VOUCHER_PREFIX).await?;

    let active_routers = routers.iter()
        .filter(|r| r.get("status").and_then(|s| s.as_str()) == Some("online"))
        .count();

    let active_users = users.iter()
        .filter(|u| u.get("active").and_then(|a| a.as_bool()).unwrap_or(false))
        .count();

    let used_vouchers = vouchers.iter()
        .filter(|v| v.get("used").and_then(|u| u.as_bool()).unwrap_or(false))
        .count();

    Ok(json!({
        "totalRouters": routers.len(),
        "activeRouters": active_routers,
        "totalUsers": users.len(),
        "activeUsers": active_users,
        "totalVouchers": vouchers.len(),
        "usedVouchers": used_vouchers,
        "unusedVouchers": vouchers.len() - used_vouchers,
    }))
}
