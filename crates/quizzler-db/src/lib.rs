//! # Quizzler DB
//!
//! Relational store access for the Quizzler API.
//!
//! This crate provides connection pool initialization using SQLx with
//! PostgreSQL, and the [`UserDirectory`] the account endpoints authenticate
//! against.
//!
//! # Example
//!
//! ```ignore
//! use quizzler_config::DatabaseConfig;
//! use quizzler_db::{PgUserDirectory, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! let users = PgUserDirectory::new(pool);
//! ```

pub mod password;
pub mod users;

use quizzler_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use users::{DirectoryError, PgUserDirectory, User, UserDirectory};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Initializes a PostgreSQL connection pool.
///
/// Should be called once during application startup. The returned pool is
/// cheaply cloneable and is shared by every request.
///
/// # Errors
///
/// Returns the underlying [`sqlx::Error`] if the URL is invalid or the first
/// connection cannot be established.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");

    Ok(pool)
}
