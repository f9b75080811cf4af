//! Borrowing models and request/response DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::device::DeviceStatus;

/// Borrowing row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Borrowing {
    pub id: Uuid,
    pub device_id: Uuid,
    pub user_id: Uuid,
    pub status: BorrowingStatus,
    pub borrow_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Borrowing lifecycle states.
///
/// One canonical spelling per state. The shorthand spellings used by older
/// data (`accept`, `reject`, `cancel`, `return`) are accepted as aliases
/// when deserializing input, never produced.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BorrowingStatus {
    Pending,
    #[serde(alias = "accept")]
    Accepted,
    #[serde(alias = "reject")]
    Rejected,
    CancelPending,
    #[serde(alias = "cancel")]
    Cancelled,
    ReturnPending,
    #[serde(alias = "return")]
    Returned,
}

impl BorrowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowingStatus::Pending => "pending",
            BorrowingStatus::Accepted => "accepted",
            BorrowingStatus::Rejected => "rejected",
            BorrowingStatus::CancelPending => "cancel-pending",
            BorrowingStatus::Cancelled => "cancelled",
            BorrowingStatus::ReturnPending => "return-pending",
            BorrowingStatus::Returned => "returned",
        }
    }

    /// True while the borrowing still holds its device. Once the borrowing
    /// reaches `rejected`, `cancelled` or `returned`, the device is free.
    pub fn holds_device(&self) -> bool {
        matches!(
            self,
            BorrowingStatus::Pending
                | BorrowingStatus::Accepted
                | BorrowingStatus::CancelPending
                | BorrowingStatus::ReturnPending
        )
    }
}

impl std::fmt::Display for BorrowingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for creating a borrowing.
///
/// Both ids are optional at the type level so a missing field reports the
/// contract's 400 instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowingRequest {
    pub device_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Borrowing enriched with device and user summaries.
///
/// The joins are LEFT: administrative deletes can leave a borrowing whose
/// device or user no longer exists.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
pub struct BorrowingDetail {
    pub id: Uuid,
    pub device_id: Uuid,
    pub user_id: Uuid,
    pub status: BorrowingStatus,
    pub borrow_date: DateTime<Utc>,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub device_status: Option<DeviceStatus>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}
