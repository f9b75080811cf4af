//! User and authentication route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, user::*};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login))
        .route("/api/users/refresh", post(auth::refresh_token))
        .route("/api/users/me", get(auth::get_current_user))
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id", put(update_user))
        .route("/api/users/:id", delete(delete_user))
}
