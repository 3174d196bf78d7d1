//! User accounts.
//!
//! [`UserDirectory`] is everything the HTTP layer needs from the relational
//! store. [`PgUserDirectory`] implements it against the `users` table:
//!
//! ```sql
//! users (id BIGSERIAL PRIMARY KEY, email TEXT UNIQUE NOT NULL,
//!        password TEXT NOT NULL, created_at TIMESTAMPTZ NOT NULL DEFAULT now())
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument, warn};

use quizzler_core::AppError;

use crate::password::{hash_password, verify_password};

/// Public view of an account. The password hash never leaves this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Email already exists")]
    EmailTaken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::EmailTaken => AppError::conflict("Email already exists"),
            other => AppError::internal(other),
        }
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Creates an account. Fails with [`DirectoryError::EmailTaken`] if the
    /// email is already registered.
    async fn create(&self, email: &str, password: &str) -> Result<User, DirectoryError>;

    /// Checks credentials. `None` for an unknown email or a wrong password,
    /// without telling the two apart.
    async fn authenticate(&self, email: &str, password: &str)
    -> Result<Option<User>, DirectoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError>;
}

#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct UserWithPassword {
    id: i64,
    email: String,
    password: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self, password), fields(db.operation = "INSERT", db.table = "users"))]
    async fn create(&self, email: &str, password: &str) -> Result<User, DirectoryError> {
        let hashed_password = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password) VALUES ($1, $2)
             RETURNING id, email, created_at",
        )
        .bind(email)
        .bind(&hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.email = %email, "Attempted to register existing email");
                return DirectoryError::EmailTaken;
            }
            error!(error = %e, "Database error creating user");
            DirectoryError::from(e)
        })?;

        debug!(user.id = %user.id, "User created");

        Ok(user)
    }

    #[instrument(skip(self, password), fields(db.operation = "SELECT", db.table = "users"))]
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DirectoryError> {
        let Some(row) = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, email, password, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        else {
            return Ok(None);
        };

        if !verify_password(password, &row.password)? {
            return Ok(None);
        }

        Ok(Some(User {
            id: row.id,
            email: row.email,
            created_at: row.created_at,
        }))
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "users"))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_taken_maps_to_conflict() {
        let err = AppError::from(DirectoryError::EmailTaken);
        assert_eq!(err.status.as_u16(), 409);
        assert_eq!(err.message(), "Email already exists");
    }

    #[test]
    fn test_database_error_maps_to_internal() {
        let err = AppError::from(DirectoryError::Database(sqlx::Error::RowNotFound));
        assert!(err.status.is_server_error());
    }

    #[test]
    fn test_user_serializes_without_password() {
        let user = User {
            id: 7,
            email: "ada@example.com".to_string(),
            created_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("password").is_none());
    }
}
