//! User administration HTTP handlers

use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminUser;
use crate::state::AppState;
use crate::user::{UpdateUserRequest, UserResponse};

use super::{ApiJson, ApiPath, Empty, Envelope};

#[derive(Serialize)]
pub struct UserBody {
    pub user: UserResponse,
}

#[derive(Serialize)]
pub struct UsersBody {
    pub users: Vec<UserResponse>,
}

/// GET /api/users - list all users
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Envelope<UsersBody>> {
    let users = state
        .user_service
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Envelope::ok("Users fetched successfully", UsersBody { users }))
}

/// GET /api/users/:id - fetch one user
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<UserBody>> {
    let user = state
        .user_service
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Envelope::ok(
        "User fetched successfully",
        UserBody { user: user.into() },
    ))
}

/// PUT /api/users/:id - update name/email/role
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Envelope<UserBody>> {
    request.validate()?;

    let user = state.user_service.update(&id, request).await?;

    Ok(Envelope::ok(
        "User updated successfully",
        UserBody { user: user.into() },
    ))
}

/// DELETE /api/users/:id - delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Empty>> {
    state.user_service.delete(&id).await?;

    Ok(Envelope::ok("User deleted successfully", Empty {}))
}
