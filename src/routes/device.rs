//! Device route definitions

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::device::*;
use crate::state::AppState;

pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/api/devices", get(list_devices))
        .route("/api/devices", post(create_device))
        .route("/api/devices/search", get(search_devices))
        .route("/api/devices/status/:id", patch(change_device_status))
        .route("/api/devices/:id", get(get_device))
        .route("/api/devices/:id", put(update_device))
        .route("/api/devices/:id", delete(delete_device))
}
