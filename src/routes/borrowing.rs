//! Borrowing route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::borrowing::*;
use crate::state::AppState;

pub fn borrowing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/borrowings", post(create_borrowing))
        .route("/api/borrowings", get(list_borrowings))
        .route("/api/borrowings/accept/:id", put(accept_borrowing))
        .route("/api/borrowings/reject/:id", put(reject_borrowing))
        .route("/api/borrowings/cancel/:id", put(cancel_borrowing))
        .route("/api/borrowings/return/:id", put(return_borrowing))
        .route("/api/borrowings/user/:id", get(list_user_borrowings))
        .route("/api/borrowings/:id", get(get_borrowing))
        .route("/api/borrowings/:id", delete(delete_borrowing))
}
