//! CLI subcommands.

pub mod migrate;
pub mod tenant;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by commands that need the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither database URL variable is set.
    #[error("Missing environment variable: SUPPLIERDB_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Connection failed.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the `SupplierDB` database named by the environment.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SUPPLIERDB_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(supplierdb_web::db::create_pool(&database_url).await?)
}
