//! Device service layer - CRUD over the devices collection.
//!
//! Normal flow only ever mutates `status` through the borrowing state
//! machine. `change_status` is the administrative escape hatch and carries
//! no consistency guarantees.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

use super::model::{
    ChangeDeviceStatusRequest, CreateDeviceRequest, Device, DeviceSearchQuery, DeviceStatus,
    UpdateDeviceRequest,
};

/// Device service errors
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for DeviceError {
    fn from(e: sqlx::Error) -> Self {
        DeviceError::Database(e.to_string())
    }
}

impl From<DeviceError> for ApiError {
    fn from(e: DeviceError) -> Self {
        match e {
            DeviceError::NotFound => ApiError::NotFound(e.to_string()),
            DeviceError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// Device service
#[derive(Clone)]
pub struct DeviceService {
    db_pool: SqlitePool,
}

impl DeviceService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// List all devices
    pub async fn list(&self) -> Result<Vec<Device>, DeviceError> {
        let devices = sqlx::query_as::<_, Device>("SELECT * FROM devices ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(devices)
    }

    /// Get a single device by ID
    pub async fn get(&self, id: &Uuid) -> Result<Option<Device>, DeviceError> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(device)
    }

    /// Search devices by optional name/type/status/location filters
    pub async fn search(&self, query: DeviceSearchQuery) -> Result<Vec<Device>, DeviceError> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("SELECT * FROM devices WHERE 1=1");

        if let Some(name) = query.name {
            query_builder.push(" AND name = ");
            query_builder.push_bind(name);
        }
        if let Some(device_type) = query.device_type {
            query_builder.push(" AND device_type = ");
            query_builder.push_bind(device_type);
        }
        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(location) = query.location {
            query_builder.push(" AND location = ");
            query_builder.push_bind(location);
        }

        query_builder.push(" ORDER BY created_at DESC");

        let devices = query_builder
            .build_query_as::<Device>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(devices)
    }

    /// Create a device
    pub async fn create(&self, request: CreateDeviceRequest) -> Result<Device, DeviceError> {
        let now = Utc::now();
        let device = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (id, name, device_type, location, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.device_type)
        .bind(&request.location)
        .bind(request.status.unwrap_or(DeviceStatus::Available))
        .bind(now)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(device)
    }

    /// Update name/type/location of a device
    pub async fn update(
        &self,
        id: &Uuid,
        request: UpdateDeviceRequest,
    ) -> Result<Device, DeviceError> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices
            SET name = ?, device_type = ?, location = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.device_type)
        .bind(&request.location)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(DeviceError::NotFound)?;

        Ok(device)
    }

    /// Delete a device
    pub async fn delete(&self, id: &Uuid) -> Result<(), DeviceError> {
        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DeviceError::NotFound);
        }

        Ok(())
    }

    /// Administrative status override, bypassing the borrowing lifecycle
    pub async fn change_status(
        &self,
        id: &Uuid,
        request: ChangeDeviceStatusRequest,
    ) -> Result<Device, DeviceError> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices
            SET status = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(request.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(DeviceError::NotFound)?;

        tracing::warn!(device_id = %id, status = %device.status, "Device status overridden outside borrowing flow");

        Ok(device)
    }
}
