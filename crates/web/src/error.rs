//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. Handlers that render forms map
//! their errors back onto the form instead; everything else returns
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use supplierdb_core::TenantStoreError;

use crate::services::{AuthError, EmailError, SupplierError};

/// Application-level error type for the web server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Supplier operation failed.
    #[error("Supplier error: {0}")]
    Supplier(#[from] SupplierError),

    /// Tenant store failed outside a service call.
    #[error("Tenant store error: {0}")]
    Tenants(#[from] TenantStoreError),

    /// Reset email could not be delivered.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => err.status(),
            Self::Supplier(err) => match err {
                SupplierError::UnknownTenant(_) => StatusCode::NOT_FOUND,
                SupplierError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
                SupplierError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
                SupplierError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Tenants(TenantStoreError::UnknownNamespace(_)) => StatusCode::NOT_FOUND,
            Self::Tenants(TenantStoreError::Storage(_)) | Self::Email(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.user_message(),
            Self::Supplier(SupplierError::UnknownTenant(_))
            | Self::Tenants(TenantStoreError::UnknownNamespace(_)) => {
                "No supplier form exists at this address.".to_string()
            }
            Self::Supplier(SupplierError::InvalidRecord(err)) => {
                format!("Invalid submission: {err}")
            }
            _ if self.status() == StatusCode::SERVICE_UNAVAILABLE => {
                "Service temporarily unavailable, please try again".to_string()
            }
            // Don't expose internal error details to clients
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, self.user_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for a logged-in account.
pub fn set_sentry_user(account_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
