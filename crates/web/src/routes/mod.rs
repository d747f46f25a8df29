//! HTTP route handlers for the supplier registry.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (tenant store)
//!
//! # Auth
//! GET  /auth/signup              - Company signup page
//! POST /auth/signup              - Create company namespace and account
//! GET  /auth/login               - Login page
//! POST /auth/login               - Login by email or company name
//! POST /auth/logout              - Logout
//! GET  /auth/forgot-password     - Request a reset link
//! POST /auth/forgot-password     - Email a reset link
//! GET  /auth/reset-password      - Reset page for an emailed token
//! POST /auth/reset-password      - Set a new password
//!
//! # Account (requires auth)
//! GET  /account                  - Dashboard with the tenant's records
//! GET  /account/export           - Download records as .xlsx
//!
//! # Supplier forms (public)
//! GET  /{namespace}              - Supplier form of a tenant
//! POST /{namespace}/submit       - Store a supplier record
//! ```
//!
//! Reserved namespaces keep the fixed routes from being shadowed.

pub mod account;
pub mod auth;
pub mod home;
pub mod supplier;

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::error;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Create all routes for the web server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .route("/account", get(account::dashboard))
        .route("/account/export", get(account::export))
        .route("/{namespace}", get(supplier::form))
        .route("/{namespace}/submit", post(supplier::submit))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the tenant store is not reachable.
async fn readiness(State(state): State<AppState>) -> error::Result<&'static str> {
    state.tenants().ping().await?;
    Ok("ok")
}
