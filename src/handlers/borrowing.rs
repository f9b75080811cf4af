//! Borrowing HTTP handlers
//!
//! The accept/reject endpoints resolve whichever pending sub-state the
//! borrowing is in; cancel/return file a request that an admin resolves
//! later. See [`crate::borrowing::transition`] for the state machine.

use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use crate::borrowing::{BorrowingDetail, CreateBorrowingRequest, Verdict};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminUser, AuthenticatedUser};
use crate::state::AppState;

use super::{ApiJson, ApiPath, Empty, Envelope};

#[derive(Serialize)]
pub struct BorrowingBody {
    pub borrowing: BorrowingDetail,
}

#[derive(Serialize)]
pub struct BorrowingsBody {
    pub borrowings: Vec<BorrowingDetail>,
}

/// POST /api/borrowings - borrow a device
pub async fn create_borrowing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(request): ApiJson<CreateBorrowingRequest>,
) -> ApiResult<Envelope<BorrowingBody>> {
    let (Some(device_id), Some(user_id)) = (request.device_id, request.user_id) else {
        return Err(ApiError::BadRequest(
            "Device ID and User ID are required".to_string(),
        ));
    };

    // Non-admins can only borrow for themselves.
    if !user.is_admin() && user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Cannot create a borrowing for another user".to_string(),
        ));
    }

    let borrowing = state
        .borrowing_service
        .create(device_id, user_id)
        .await?;

    Ok(Envelope::created(
        "Borrowing created successfully",
        BorrowingBody { borrowing },
    ))
}

/// PUT /api/borrowings/accept/:id - approve the pending state
pub async fn accept_borrowing(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<BorrowingBody>> {
    let borrowing = state
        .borrowing_service
        .resolve(&id, Verdict::Approve)
        .await?;

    Ok(Envelope::ok(
        "Borrowing accepted successfully",
        BorrowingBody { borrowing },
    ))
}

/// PUT /api/borrowings/reject/:id - deny the pending state
pub async fn reject_borrowing(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<BorrowingBody>> {
    let borrowing = state
        .borrowing_service
        .resolve(&id, Verdict::Deny)
        .await?;

    Ok(Envelope::ok(
        "Borrowing rejected successfully",
        BorrowingBody { borrowing },
    ))
}

/// PUT /api/borrowings/cancel/:id - request cancellation
pub async fn cancel_borrowing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<BorrowingBody>> {
    check_ownership(&state, &user, &id).await?;

    let borrowing = state.borrowing_service.request_cancel(&id).await?;

    Ok(Envelope::ok(
        "Cancellation requested successfully",
        BorrowingBody { borrowing },
    ))
}

/// PUT /api/borrowings/return/:id - request return
pub async fn return_borrowing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<BorrowingBody>> {
    check_ownership(&state, &user, &id).await?;

    let borrowing = state.borrowing_service.request_return(&id).await?;

    Ok(Envelope::ok(
        "Return requested successfully",
        BorrowingBody { borrowing },
    ))
}

/// DELETE /api/borrowings/:id - administrative delete, frees the device
pub async fn delete_borrowing(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Empty>> {
    state.borrowing_service.delete(&id).await?;

    Ok(Envelope::ok("Borrowing deleted successfully", Empty {}))
}

/// GET /api/borrowings - list all borrowings
pub async fn list_borrowings(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Envelope<BorrowingsBody>> {
    let borrowings = state.borrowing_service.list().await?;

    Ok(Envelope::ok(
        "Borrowings fetched successfully",
        BorrowingsBody { borrowings },
    ))
}

/// GET /api/borrowings/:id - fetch one borrowing
pub async fn get_borrowing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<BorrowingBody>> {
    let borrowing = state
        .borrowing_service
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Borrowing not found".to_string()))?;

    if !user.is_admin() && borrowing.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Cannot view another user's borrowing".to_string(),
        ));
    }

    Ok(Envelope::ok(
        "Borrowing fetched successfully",
        BorrowingBody { borrowing },
    ))
}

/// GET /api/borrowings/user/:id - list borrowings of one user
pub async fn list_user_borrowings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Envelope<BorrowingsBody>> {
    if !user.is_admin() && user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Cannot view another user's borrowings".to_string(),
        ));
    }

    let borrowings = state.borrowing_service.list_for_user(&user_id).await?;

    Ok(Envelope::ok(
        "Borrowings fetched successfully",
        BorrowingsBody { borrowings },
    ))
}

/// Cancel/return are borrower-initiated: the caller must own the
/// borrowing unless they are an admin.
async fn check_ownership(
    state: &AppState,
    user: &AuthenticatedUser,
    borrowing_id: &Uuid,
) -> ApiResult<()> {
    let borrowing = state
        .borrowing_service
        .get_record(borrowing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Borrowing not found".to_string()))?;

    if !user.is_admin() && borrowing.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Cannot modify another user's borrowing".to_string(),
        ));
    }

    Ok(())
}
