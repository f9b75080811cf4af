//! User service layer - registration, credential checks, admin CRUD.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, PasswordError};
use crate::error::ApiError;

use super::model::{RegisterRequest, UpdateUserRequest, User, UserRole};

/// User service errors
#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email is already in use")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Password error: {0}")]
    Password(String),
}

impl From<sqlx::Error> for UserError {
    fn from(e: sqlx::Error) -> Self {
        UserError::Database(e.to_string())
    }
}

impl From<PasswordError> for UserError {
    fn from(e: PasswordError) -> Self {
        UserError::Password(e.to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => ApiError::NotFound(e.to_string()),
            UserError::EmailTaken => ApiError::BadRequest(e.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            UserError::Database(msg) => ApiError::DatabaseError(msg),
            UserError::Password(msg) => ApiError::InternalError(msg),
        }
    }
}

/// User service
#[derive(Clone)]
pub struct UserService {
    db_pool: SqlitePool,
}

impl UserService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Register a new user. The password is bcrypt-hashed before storage.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, UserError> {
        if self.find_by_email(&request.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(request.role.unwrap_or(UserRole::User))
        .bind(now)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            // Unique index on email; racing registrations land here.
            sqlx::Error::Database(ref db) if db.is_unique_violation() => UserError::EmailTaken,
            other => UserError::Database(other.to_string()),
        })?;

        Ok(user)
    }

    /// Check credentials and return the matching user.
    ///
    /// Missing user and wrong password are deliberately indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// List all users, newest first
    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(users)
    }

    /// Get a single user by ID
    pub async fn get(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(user)
    }

    /// Update name/email/role of a user
    pub async fn update(&self, id: &Uuid, request: UpdateUserRequest) -> Result<User, UserError> {
        // Email must stay unique across all other users.
        let taken = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE email = ? AND id != ?")
            .bind(&request.email)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        if taken.is_some() {
            return Err(UserError::EmailTaken);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = ?, email = ?, role = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.role)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(UserError::NotFound)?;

        Ok(user)
    }

    /// Delete a user. Their borrowings are kept (non-owning references).
    pub async fn delete(&self, id: &Uuid) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }
}
