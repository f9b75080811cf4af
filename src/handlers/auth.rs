//! Authentication HTTP handlers
//!
//! Registration, login, token refresh, and the current-user endpoint.

use axum::extract::State;
use serde::Serialize;
use validator::Validate;

use crate::auth::get_user_id_from_claims;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use crate::user::{
    AuthTokensResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse,
};

use super::{ApiJson, Envelope};

#[derive(Serialize)]
pub struct UserBody {
    pub user: UserResponse,
}

/// POST /api/users/register - create an account and issue tokens
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<Envelope<AuthTokensResponse>> {
    request.validate()?;

    let user = state.user_service.register(request).await?;
    let tokens = state.auth_service.issue_tokens(&user)?;

    Ok(Envelope::created("User registered successfully", tokens))
}

/// POST /api/users/login - check credentials and issue tokens
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Envelope<AuthTokensResponse>> {
    let user = state
        .user_service
        .authenticate(&request.email, &request.password)
        .await?;
    let tokens = state.auth_service.issue_tokens(&user)?;

    Ok(Envelope::ok("Login successful", tokens))
}

/// POST /api/users/refresh - exchange a refresh token for a new pair
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshTokenRequest>,
) -> ApiResult<Envelope<AuthTokensResponse>> {
    let claims = state.auth_service.verify_refresh_token(&request.refresh_token)?;
    let user_id = get_user_id_from_claims(&claims)?;

    // The account may have been deleted since the token was issued.
    let user = state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    let tokens = state.auth_service.issue_tokens(&user)?;

    Ok(Envelope::ok("Token refreshed successfully", tokens))
}

/// GET /api/users/me - current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Envelope<UserBody>> {
    let user = state
        .user_service
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Envelope::ok(
        "User fetched successfully",
        UserBody { user: user.into() },
    ))
}
