//! Authentication extractors and session helpers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAccount, session_keys};

/// Extractor that requires a logged-in account.
///
/// Anonymous requests are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAccount(account): RequireAccount) -> impl IntoResponse {
///     format!("Records for {}", account.namespace)
/// }
/// ```
pub struct RequireAccount(pub CurrentAccount);

/// Rejection for [`RequireAccount`].
#[derive(Debug)]
pub enum AuthRejection {
    /// No account in the session.
    RedirectToLogin,
    /// The session layer is missing from the router.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAccount
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::SessionUnavailable)?;

        let account = session
            .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::RedirectToLogin)?;

        tracing::Span::current().record("account_id", account.id.as_i32());
        Ok(Self(account))
    }
}

/// Extractor that optionally gets the current account.
pub struct OptionalAccount(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAccount
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(account))
    }
}

/// Store the logged-in account in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &CurrentAccount,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ACCOUNT, account).await
}

/// Remove the logged-in account from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_account(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
