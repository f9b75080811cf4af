//! Device HTTP handlers
//!
//! Reads are public; mutations are admin-only.

use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::device::{
    ChangeDeviceStatusRequest, CreateDeviceRequest, Device, DeviceSearchQuery, UpdateDeviceRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminUser;
use crate::state::AppState;

use super::{ApiJson, ApiPath, ApiQuery, Empty, Envelope};

#[derive(Serialize)]
pub struct DeviceBody {
    pub device: Device,
}

#[derive(Serialize)]
pub struct DevicesBody {
    pub devices: Vec<Device>,
}

/// GET /api/devices - list all devices
pub async fn list_devices(State(state): State<AppState>) -> ApiResult<Envelope<DevicesBody>> {
    let devices = state.device_service.list().await?;

    Ok(Envelope::ok(
        "Devices fetched successfully",
        DevicesBody { devices },
    ))
}

/// GET /api/devices/search - filter by name/type/status/location
pub async fn search_devices(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DeviceSearchQuery>,
) -> ApiResult<Envelope<DevicesBody>> {
    let devices = state.device_service.search(query).await?;

    Ok(Envelope::ok(
        "Devices fetched successfully",
        DevicesBody { devices },
    ))
}

/// GET /api/devices/:id - fetch one device
pub async fn get_device(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<DeviceBody>> {
    let device = state
        .device_service
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    Ok(Envelope::ok(
        "Device fetched successfully",
        DeviceBody { device },
    ))
}

/// POST /api/devices - create a device
pub async fn create_device(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(request): ApiJson<CreateDeviceRequest>,
) -> ApiResult<Envelope<DeviceBody>> {
    request.validate()?;

    let device = state.device_service.create(request).await?;

    Ok(Envelope::created(
        "Device created successfully",
        DeviceBody { device },
    ))
}

/// PUT /api/devices/:id - update name/type/location
pub async fn update_device(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateDeviceRequest>,
) -> ApiResult<Envelope<DeviceBody>> {
    request.validate()?;

    let device = state.device_service.update(&id, request).await?;

    Ok(Envelope::ok(
        "Device updated successfully",
        DeviceBody { device },
    ))
}

/// DELETE /api/devices/:id - delete a device
pub async fn delete_device(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Empty>> {
    state.device_service.delete(&id).await?;

    Ok(Envelope::ok("Device deleted successfully", Empty {}))
}

/// PATCH /api/devices/status/:id - administrative status override
pub async fn change_device_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ChangeDeviceStatusRequest>,
) -> ApiResult<Envelope<DeviceBody>> {
    let device = state.device_service.change_status(&id, request).await?;

    Ok(Envelope::ok(
        "Device status changed successfully",
        DeviceBody { device },
    ))
}
