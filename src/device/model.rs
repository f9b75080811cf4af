//! Device models and request/response DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Device row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location: String,
    pub status: DeviceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Device availability flag.
///
/// Closed enum. Legacy provisional spellings (`aready`) from old data are
/// accepted at the ingestion boundary only and normalize to `available`.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[serde(alias = "aready")]
    Available,
    Borrowed,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Available => "available",
            DeviceStatus::Borrowed => "borrowed",
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for creating a device
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeviceRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub device_type: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    /// Defaults to `available` when omitted
    pub status: Option<DeviceStatus>,
}

/// Request body for updating a device. Status is deliberately absent:
/// it changes through the borrowing lifecycle or the explicit status
/// endpoint, never through a plain edit.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDeviceRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub device_type: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
}

/// Request body for the administrative status override
#[derive(Debug, Deserialize)]
pub struct ChangeDeviceStatusRequest {
    pub status: DeviceStatus,
}

/// Query parameters for device search
#[derive(Debug, Default, Deserialize)]
pub struct DeviceSearchQuery {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub status: Option<DeviceStatus>,
    pub location: Option<String>,
}
