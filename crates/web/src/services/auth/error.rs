//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use supplierdb_core::{DirectoryError, EmailError, Namespace, NamespaceError, TenantStoreError};

/// Errors that can occur during signup, login and password reset.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The company name does not yield a usable namespace.
    #[error("invalid company name: {0}")]
    InvalidCompanyName(#[from] NamespaceError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Wrong password, or no account for the login key.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// Another company already owns the derived namespace.
    #[error("company namespace already taken: {0}")]
    CompanyTaken(Namespace),

    /// Reset token unknown, used or expired.
    #[error("reset token is expired or invalid")]
    ResetExpiredOrInvalid,

    /// Account directory failure.
    #[error("directory error: {0}")]
    Directory(DirectoryError),

    /// Tenant store failure.
    #[error("tenant store error: {0}")]
    Tenants(#[from] TenantStoreError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail => Self::DuplicateEmail,
            DirectoryError::NamespaceTaken(namespace) => Self::CompanyTaken(namespace),
            DirectoryError::ExpiredOrInvalid => Self::ResetExpiredOrInvalid,
            other => Self::Directory(other),
        }
    }
}

impl AuthError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::InvalidEmail(_)
            | Self::InvalidCompanyName(_)
            | Self::WeakPassword(_)
            | Self::PasswordMismatch
            | Self::ResetExpiredOrInvalid => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail | Self::CompanyTaken(_) => StatusCode::CONFLICT,
            Self::Directory(DirectoryError::Storage(_)) | Self::Tenants(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Directory(_) | Self::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is a server fault rather than bad input.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Message safe to show on the form that caused the error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Please fill in the {field} field."),
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::InvalidCompanyName(NamespaceError::Reserved(_)) => {
                "That company name is reserved. Please add to it, for example your town."
                    .to_string()
            }
            Self::InvalidCompanyName(_) => {
                "Company name must contain at least one letter or digit.".to_string()
            }
            Self::WeakPassword(msg) => msg.clone(),
            Self::PasswordMismatch => "Passwords do not match.".to_string(),
            Self::InvalidCredentials => "Invalid credentials. Please try again.".to_string(),
            Self::DuplicateEmail => "An account with this email already exists.".to_string(),
            Self::CompanyTaken(_) => {
                "A company with this name is already registered.".to_string()
            }
            Self::ResetExpiredOrInvalid => {
                "This reset link has expired or was already used. Please request a new one."
                    .to_string()
            }
            Self::Directory(_) | Self::Tenants(_) | Self::PasswordHash => {
                "Something went wrong on our side. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_errors_are_classified() {
        assert!(matches!(
            AuthError::from(DirectoryError::DuplicateEmail),
            AuthError::DuplicateEmail
        ));
        assert!(matches!(
            AuthError::from(DirectoryError::NamespaceTaken(Namespace::derive("acme").unwrap())),
            AuthError::CompanyTaken(ns) if ns.as_str() == "acme"
        ));
        assert!(matches!(
            AuthError::from(DirectoryError::ExpiredOrInvalid),
            AuthError::ResetExpiredOrInvalid
        ));
        assert!(matches!(
            AuthError::from(DirectoryError::Storage("down".to_string())),
            AuthError::Directory(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::InvalidCompanyName(NamespaceError::Empty).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ResetExpiredOrInvalid.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Tenants(TenantStoreError::Storage("timeout".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Directory(DirectoryError::Storage("timeout".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(AuthError::PasswordHash.is_server_error());
        assert!(!AuthError::PasswordMismatch.is_server_error());
    }

    #[test]
    fn test_user_message_hides_storage_details() {
        let err = AuthError::Directory(DirectoryError::Storage("pg: connection refused".into()));
        assert!(!err.user_message().contains("connection refused"));
    }
}
