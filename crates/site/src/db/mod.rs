//! Database operations for the site `PostgreSQL`.
//!
//! # Tables
//!
//! - `orders` - the sole persisted entity: one row per submitted order,
//!   line items as a JSONB blob (never normalized into their own rows)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and are NOT run
//! automatically on startup. Apply them explicitly:
//!
//! ```bash
//! sqlx migrate run --source crates/site/migrations
//! ```

pub mod orders;

use std::time::Duration;

use lemongrass_core::OrderStatus;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A status write that the order's current status does not allow.
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
