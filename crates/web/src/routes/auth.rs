//! Authentication route handlers.
//!
//! Handles company signup, login, logout and password reset. Form errors
//! re-render the form with the status code of the failure; server faults go
//! through [`AppError`] so they reach Sentry.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_account, set_current_account};
use crate::models::CurrentAccount;
use crate::services::{AuthError, ResetMessage, SignupRequest};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub password: String,
}

/// Login form data.
///
/// `login` accepts either the account email or the company name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

/// Forgot password form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
}

/// Query parameters of the emailed reset link.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub company_name: String,
}

/// Signup success page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup_success.html")]
pub struct SignupSuccessTemplate {
    pub company_name: String,
    pub form_url: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<&'static str>,
    pub login: String,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub error: Option<String>,
    pub token: String,
}

/// Text shown for a `?success=` code.
fn success_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "reset" => Some("Your password has been reset. Please log in."),
        "sent" => Some(
            "If an account exists for that email, a reset link is on its way. \
             Check your inbox.",
        ),
        _ => None,
    }
}

/// Respond to a failed form submission.
///
/// Input errors re-render `page` with the error's status; server faults
/// become an [`AppError`] response.
fn form_error(err: AuthError, page: impl FnOnce(String) -> Response) -> Response {
    if err.is_server_error() {
        return AppError::from(err).into_response();
    }
    tracing::info!(error = %err, "Auth form rejected");
    let mut response = page(err.user_message());
    *response.status_mut() = err.status();
    response
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page() -> impl IntoResponse {
    SignupTemplate {
        error: None,
        name: String::new(),
        email: String::new(),
        company_name: String::new(),
    }
}

/// Handle signup form submission.
///
/// Creates the company's namespace and account, logs the account in and
/// shows the public URL of its supplier form.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let request = SignupRequest {
        display_name: form.name,
        email: form.email,
        company_name: form.company_name,
        password: form.password,
    };

    let result = state.auth().signup(&request).await;
    match result {
        Ok(account) => {
            if let Err(e) = set_current_account(&session, &CurrentAccount::from(&account)).await {
                return AppError::from(e).into_response();
            }
            set_sentry_user(&account.id, Some(account.email.as_str()));

            (
                StatusCode::CREATED,
                SignupSuccessTemplate {
                    form_url: state.config().form_url(&account.namespace),
                    company_name: account.company_name,
                },
            )
                .into_response()
        }
        Err(err) => form_error(err, |message| {
            SignupTemplate {
                error: Some(message),
                name: request.display_name,
                email: request.email,
                company_name: request.company_name,
            }
            .into_response()
        }),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: None,
        success: success_message(query.success.as_deref()),
        login: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = state.auth().login(&form.login, &form.password).await;
    match result {
        Ok(account) => {
            if let Err(e) = set_current_account(&session, &CurrentAccount::from(&account)).await {
                return AppError::from(e).into_response();
            }
            set_sentry_user(&account.id, Some(account.email.as_str()));
            tracing::info!(account_id = account.id.as_i32(), "Logged in");

            Redirect::to("/account").into_response()
        }
        Err(err) => form_error(err, |message| {
            LoginTemplate {
                error: Some(message),
                success: None,
                login: form.login,
            }
            .into_response()
        }),
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_account(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        error: None,
        success: success_message(query.success.as_deref()),
    }
}

/// Handle forgot password form submission.
///
/// Responds identically whether or not the email belongs to an account.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let config = state.config();
    let issued = state
        .auth()
        .issue_reset_token(&form.email, config.reset_token_ttl, Utc::now())
        .await;

    match issued {
        Ok(Some(issued)) => {
            let message = ResetMessage {
                to: issued.account.email,
                name: issued.account.display_name,
                reset_url: config.reset_url(&issued.token),
                ttl_minutes: config.reset_token_ttl.num_minutes(),
            };
            if let Err(e) = state.mailer().send_reset_link(&message).await {
                return AppError::from(e).into_response();
            }
        }
        Ok(None) => tracing::info!("Password reset requested for unknown email"),
        Err(err) => {
            return form_error(err, |message| {
                ForgotPasswordTemplate {
                    error: Some(message),
                    success: None,
                }
                .into_response()
            });
        }
    }

    Redirect::to("/auth/forgot-password?success=sent").into_response()
}

/// Display the reset password page for an emailed token.
pub async fn reset_password_page(Query(query): Query<TokenQuery>) -> Response {
    match query.token.filter(|t| !t.is_empty()) {
        Some(token) => ResetPasswordTemplate { error: None, token }.into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            ResetPasswordTemplate {
                error: Some(AuthError::ResetExpiredOrInvalid.user_message()),
                token: String::new(),
            },
        )
            .into_response(),
    }
}

/// Handle reset password form submission.
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let result = state
        .auth()
        .reset_password(&form.token, &form.password, &form.password_confirm, Utc::now())
        .await;

    match result {
        Ok(_) => Redirect::to("/auth/login?success=reset").into_response(),
        Err(err) => form_error(err, |message| {
            ResetPasswordTemplate {
                error: Some(message),
                token: form.token,
            }
            .into_response()
        }),
    }
}
