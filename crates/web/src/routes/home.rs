//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::middleware::OptionalAccount;
use crate::models::CurrentAccount;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub account: Option<CurrentAccount>,
}

/// Display the home page.
pub async fn home(OptionalAccount(account): OptionalAccount) -> impl IntoResponse {
    HomeTemplate { account }
}
