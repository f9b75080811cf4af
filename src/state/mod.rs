//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::borrowing::BorrowingService;
use crate::device::DeviceService;
use crate::user::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub device_service: Arc<DeviceService>,
    pub borrowing_service: Arc<BorrowingService>,
    pub auth_service: Arc<AuthService>,
    pub db_pool: SqlitePool,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, auth_service: AuthService) -> Self {
        Self {
            user_service: Arc::new(UserService::new(db_pool.clone())),
            device_service: Arc::new(DeviceService::new(db_pool.clone())),
            borrowing_service: Arc::new(BorrowingService::new(db_pool.clone())),
            auth_service: Arc::new(auth_service),
            db_pool,
        }
    }
}

// Required by the auth extractors.
impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
