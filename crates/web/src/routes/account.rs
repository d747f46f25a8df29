//! Account route handlers.
//!
//! These routes require authentication and only ever touch the logged-in
//! account's own tenant.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use supplierdb_core::{EXPORT_COLUMNS, Namespace};

use crate::error::Result;
use crate::middleware::RequireAccount;
use crate::services::export::{XLSX_CONTENT_TYPE, export_filename};
use crate::state::AppState;

/// Account dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub company_name: String,
    pub email: String,
    pub namespace: Namespace,
    pub form_url: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Display the account dashboard with the tenant's distinct records.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<DashboardTemplate> {
    let records = state.suppliers().records(&account.namespace).await?;

    let rows = records
        .iter()
        .map(|record| {
            record
                .to_export_row()
                .iter()
                .map(|cell| cell.unwrap_or_default().to_owned())
                .collect()
        })
        .collect();

    Ok(DashboardTemplate {
        form_url: state.config().form_url(&account.namespace),
        company_name: account.company_name,
        email: account.email.into_inner(),
        namespace: account.namespace,
        headers: EXPORT_COLUMNS.iter().map(|column| column.header).collect(),
        rows,
    })
}

/// Download the tenant's records as an `.xlsx` workbook.
pub async fn export(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<Response> {
    let bytes = state.suppliers().export(&account.namespace).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(&account.namespace)
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
