//! LendTrack backend library
//!
//! A device lending tracker: users borrow devices, admins approve or
//! reject, and a small state machine keeps borrowing status and device
//! availability consistent.

pub mod auth;
pub mod borrowing;
pub mod config;
pub mod db;
pub mod device;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod user;

use axum::{routing::get, Json, Router};

use state::AppState;

/// Health check response
#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

async fn root() -> &'static str {
    "LendTrack API Server"
}

/// Health check endpoint
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<HealthResponse> {
    let database = match db::check_health(&state.db_pool).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Assemble the full application router (without outer middleware layers)
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(routes::user_routes())
        .merge(routes::device_routes())
        .merge(routes::borrowing_routes())
        .with_state(app_state)
}
