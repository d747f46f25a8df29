//! Database migration command.
//!
//! Migrations live in `crates/web/migrations/` and are embedded at compile
//! time.

use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
