//! Storage adapters for the tenant store and account directory.
//!
//! # Database: `supplierdb`
//!
//! ## Tables
//!
//! - `supplierdb.tenant` - One row per signed-up company namespace
//! - `supplierdb.supplier_record` - Supplier submissions, keyed by namespace
//! - `supplierdb.account` - Company accounts and pending reset tokens
//! - `supplierdb.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p supplierdb-cli -- migrate
//! ```
//!
//! The [`memory`] adapters implement the same ports without a database and
//! back the test suites.

pub mod accounts;
pub mod memory;
pub mod tenants;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use supplierdb_core::{DirectoryError, TenantStoreError};

pub use accounts::PgUserDirectory;
pub use memory::{MemoryTenantStore, MemoryUserDirectory};
pub use tenants::PgTenantStore;

/// Errors from `PostgreSQL` adapter operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query failed or the pool timed out.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value no longer satisfies its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl From<RepositoryError> for TenantStoreError {
    fn from(err: RepositoryError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<RepositoryError> for DirectoryError {
    fn from(err: RepositoryError) -> Self {
        Self::Storage(err.to_string())
    }
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

/// Name of the unique constraint a query failed on, if any.
fn violated_unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default())
        }
        _ => None,
    }
}
