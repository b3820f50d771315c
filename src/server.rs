use anyhow::Result;
use log::{info, error};

use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;

use axum::Router;
use axum::routing::*;
use axum::extract::{Json, Extension};
use axum::response::IntoResponse;
use serde_json::json;

use crate::api;
use crate::config::{AdminConfig, Config};
use crate::datastore::store::BoxStore;

/// Shared per-process state. The store is built once at startup and handed
/// to every handler through an Extension layer.
pub struct AppState {
    pub store: BoxStore,
    pub admin: AdminConfig,
}

pub type SharedState = Arc<AppState>;

pub async fn server_run(config: &Config) -> Result<()> {
    let store = config.datastore.new_store().await?;

    let state: SharedState = Arc::new(AppState {
        store,
        admin: config.admin.clone(),
    });

    let app = router(state);

    // run our app with hyper
    // `axum::Server` is a re-export of `hyper::Server`
    let addr = config.server.host_addr.parse::<SocketAddrV4>().map_err(|e| { error!("{e}"); e })?;

    info!("Listening on {:?}", addr);
    axum::Server::bind(&SocketAddr::V4(addr))
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/verify", get(api::auth::verify))
        .route("/auth/logout", post(api::auth::logout))
        .route("/routers", get(api::routers::list).post(api::routers::create))
        .route("/routers/:id", put(api::routers::update).delete(api::routers::remove))
        .route("/users", get(api::users::list).post(api::users::create))
        .route("/users/bulk", post(api::users::create_bulk))
        .route("/users/:id", put(api::users::update).delete(api::users::remove))
        .route("/vouchers", get(api::vouchers::list))
        .route("/vouchers/generate", post(api::vouchers::generate))
        .route("/vouchers/:id", delete(api::vouchers::remove))
        .route("/hotspot/active-users", get(api::hotspot::active_users))
        .route("/session-settings", get(api::settings::get_session_settings).put(api::settings::put_session_settings))
        .route("/template", get(api::settings::get_template).put(api::settings::put_template))
        .route("/reports/logs", get(api::reports::logs))
        .route("/reports/traffic", get(api::reports::traffic))
        .route("/analytics/dashboard", get(api::analytics::dashboard))
        .route("/analytics/traffic", get(api::analytics::traffic))
        .layer(Extension(state))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
