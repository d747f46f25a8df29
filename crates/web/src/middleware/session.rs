//! Session middleware configuration.
//!
//! Production uses the `PostgreSQL` store from tower-sessions-sqlx-store; tests
//! pass the in-memory store. Cookie settings are identical for both.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "supplierdb_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the `PostgreSQL` session store.
///
/// The `supplierdb.session` table is created by the schema migration.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected by the store.
pub fn postgres_store(pool: &PgPool) -> Result<PostgresStore, String> {
    PostgresStore::new(pool.clone())
        .with_schema_name("supplierdb")?
        .with_table_name("session")
}

/// Create the session layer over any session store.
///
/// The cookie is marked `Secure` when the public base URL is HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &WebConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let is_secure = config.base_url.scheme() == "https";

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
