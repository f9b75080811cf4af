//! Borrowing service layer - lifecycle coordination between borrowing
//! records and the device availability flag.
//!
//! Two write paths need care:
//!
//! * Creation claims the device and inserts the record inside one
//!   transaction, keyed on a compare-and-swap of the device status. Two
//!   concurrent borrow requests for one device cannot both succeed, and a
//!   failed claim leaves no partial state.
//! * Every status transition compare-and-swaps on the previously observed
//!   status, so racing transitions on one borrowing serialize: exactly one
//!   wins, the loser gets a conflict.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::device::DeviceStatus;
use crate::error::ApiError;

use super::model::{Borrowing, BorrowingDetail, BorrowingStatus};
use super::transition::{self, InvalidTransition, Verdict};

const DETAIL_SELECT: &str = r#"
    SELECT b.id, b.device_id, b.user_id, b.status, b.borrow_date,
           d.name AS device_name, d.device_type AS device_type, d.status AS device_status,
           u.name AS user_name, u.email AS user_email
    FROM borrowings b
    LEFT JOIN devices d ON d.id = b.device_id
    LEFT JOIN users u ON u.id = b.user_id
"#;

/// Borrowing service errors
#[derive(Error, Debug)]
pub enum BorrowingError {
    #[error("Borrowing not found")]
    NotFound,

    #[error("Device not found")]
    DeviceNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Device is already borrowed")]
    DeviceUnavailable,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Borrowing was modified concurrently, please retry")]
    ConcurrentUpdate,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for BorrowingError {
    fn from(e: sqlx::Error) -> Self {
        BorrowingError::Database(e.to_string())
    }
}

impl From<BorrowingError> for ApiError {
    fn from(e: BorrowingError) -> Self {
        match e {
            BorrowingError::NotFound
            | BorrowingError::DeviceNotFound
            | BorrowingError::UserNotFound => ApiError::NotFound(e.to_string()),
            BorrowingError::DeviceUnavailable
            | BorrowingError::InvalidTransition(_)
            | BorrowingError::ConcurrentUpdate => ApiError::Conflict(e.to_string()),
            BorrowingError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// Borrowing service
#[derive(Clone)]
pub struct BorrowingService {
    db_pool: SqlitePool,
}

impl BorrowingService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Create a borrowing: claim the device and insert the record as one
    /// atomic unit. The new borrowing starts in `pending`.
    pub async fn create(
        &self,
        device_id: Uuid,
        user_id: Uuid,
    ) -> Result<BorrowingDetail, BorrowingError> {
        let user_exists = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;
        if user_exists.is_none() {
            return Err(BorrowingError::UserNotFound);
        }

        let device_status =
            sqlx::query_as::<_, (DeviceStatus,)>("SELECT status FROM devices WHERE id = ?")
                .bind(device_id)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or(BorrowingError::DeviceNotFound)?;
        if device_status.0 == DeviceStatus::Borrowed {
            return Err(BorrowingError::DeviceUnavailable);
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.db_pool.begin().await?;

        // The claim is the linearization point: whoever flips
        // available -> borrowed owns the device. A lost race surfaces here
        // even though the pre-check above passed.
        let claimed = sqlx::query(
            "UPDATE devices SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(DeviceStatus::Borrowed)
        .bind(now)
        .bind(device_id)
        .bind(DeviceStatus::Available)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return Err(BorrowingError::DeviceUnavailable);
        }

        sqlx::query(
            r#"
            INSERT INTO borrowings (id, device_id, user_id, status, borrow_date, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(device_id)
        .bind(user_id)
        .bind(BorrowingStatus::Pending)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(borrowing_id = %id, device_id = %device_id, user_id = %user_id, "Borrowing created");

        self.get(&id).await?.ok_or(BorrowingError::NotFound)
    }

    /// Resolve a pending state with an administrative verdict (the
    /// overloaded accept/reject operation).
    pub async fn resolve(
        &self,
        id: &Uuid,
        verdict: Verdict,
    ) -> Result<BorrowingDetail, BorrowingError> {
        let borrowing = self.get_record(id).await?.ok_or(BorrowingError::NotFound)?;
        let resolution = transition::resolve(borrowing.status, verdict)?;

        self.apply_transition(&borrowing, resolution.next, resolution.releases_device)
            .await?;

        tracing::info!(
            borrowing_id = %id,
            from = %borrowing.status,
            to = %resolution.next,
            "Borrowing resolved"
        );

        self.get(id).await?.ok_or(BorrowingError::NotFound)
    }

    /// Borrower-initiated cancellation request
    pub async fn request_cancel(&self, id: &Uuid) -> Result<BorrowingDetail, BorrowingError> {
        let borrowing = self.get_record(id).await?.ok_or(BorrowingError::NotFound)?;
        let next = transition::request_cancel(borrowing.status)?;

        self.apply_transition(&borrowing, next, false).await?;

        self.get(id).await?.ok_or(BorrowingError::NotFound)
    }

    /// Borrower-initiated return request
    pub async fn request_return(&self, id: &Uuid) -> Result<BorrowingDetail, BorrowingError> {
        let borrowing = self.get_record(id).await?.ok_or(BorrowingError::NotFound)?;
        let next = transition::request_return(borrowing.status)?;

        self.apply_transition(&borrowing, next, false).await?;

        self.get(id).await?.ok_or(BorrowingError::NotFound)
    }

    /// Administrative delete: frees the device unconditionally, then
    /// removes the record. Not gated on the borrowing's status.
    pub async fn delete(&self, id: &Uuid) -> Result<(), BorrowingError> {
        let borrowing = self.get_record(id).await?.ok_or(BorrowingError::NotFound)?;

        let device_exists = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM devices WHERE id = ?")
            .bind(borrowing.device_id)
            .fetch_optional(&self.db_pool)
            .await?;
        if device_exists.is_none() {
            return Err(BorrowingError::DeviceNotFound);
        }

        let mut tx = self.db_pool.begin().await?;

        sqlx::query("UPDATE devices SET status = ?, updated_at = ? WHERE id = ?")
            .bind(DeviceStatus::Available)
            .bind(Utc::now())
            .bind(borrowing.device_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM borrowings WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(borrowing_id = %id, device_id = %borrowing.device_id, "Borrowing deleted, device freed");

        Ok(())
    }

    /// List all borrowings with device/user summaries, newest first
    pub async fn list(&self) -> Result<Vec<BorrowingDetail>, BorrowingError> {
        let sql = format!("{DETAIL_SELECT} ORDER BY b.borrow_date DESC");
        let borrowings = sqlx::query_as::<_, BorrowingDetail>(&sql)
            .fetch_all(&self.db_pool)
            .await?;

        Ok(borrowings)
    }

    /// Get a single borrowing with device/user summaries
    pub async fn get(&self, id: &Uuid) -> Result<Option<BorrowingDetail>, BorrowingError> {
        let sql = format!("{DETAIL_SELECT} WHERE b.id = ?");
        let borrowing = sqlx::query_as::<_, BorrowingDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(borrowing)
    }

    /// List all borrowings of one user, newest first
    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<BorrowingDetail>, BorrowingError> {
        let sql = format!("{DETAIL_SELECT} WHERE b.user_id = ? ORDER BY b.borrow_date DESC");
        let borrowings = sqlx::query_as::<_, BorrowingDetail>(&sql)
            .bind(user_id)
            .fetch_all(&self.db_pool)
            .await?;

        Ok(borrowings)
    }

    /// Get the raw borrowing row (for ownership checks in handlers)
    pub async fn get_record(&self, id: &Uuid) -> Result<Option<Borrowing>, BorrowingError> {
        let borrowing = sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(borrowing)
    }

    /// Apply a status change with a compare-and-swap on the status the
    /// caller observed, optionally freeing the device in the same
    /// transaction.
    async fn apply_transition(
        &self,
        borrowing: &Borrowing,
        next: BorrowingStatus,
        releases_device: bool,
    ) -> Result<(), BorrowingError> {
        let now = Utc::now();
        let mut tx = self.db_pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE borrowings SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(next)
        .bind(now)
        .bind(borrowing.id)
        .bind(borrowing.status)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(BorrowingError::ConcurrentUpdate);
        }

        if releases_device {
            sqlx::query("UPDATE devices SET status = ?, updated_at = ? WHERE id = ?")
                .bind(DeviceStatus::Available)
                .bind(now)
                .bind(borrowing.device_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
