//! Public supplier form route handlers.
//!
//! Every tenant gets a form at `/{namespace}`; submissions are stored in that
//! tenant's collection only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use supplierdb_core::{Namespace, RawSupplierFields};

use crate::error::{AppError, Result};
use crate::services::SupplierError;
use crate::state::AppState;

/// Supplier form template.
#[derive(Template, WebTemplate)]
#[template(path = "supplier/form.html")]
pub struct SupplierFormTemplate {
    pub namespace: Namespace,
    pub error: Option<String>,
    pub values: RawSupplierFields,
}

/// Submission confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "supplier/submitted.html")]
pub struct SubmittedTemplate {
    pub namespace: Namespace,
    pub supplier_name: String,
}

/// Display a tenant's supplier form.
pub async fn form(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<SupplierFormTemplate> {
    let namespace = state.suppliers().resolve(&segment).await?;

    Ok(SupplierFormTemplate {
        namespace,
        error: None,
        values: RawSupplierFields::default(),
    })
}

/// Handle a supplier form submission.
pub async fn submit(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Form(fields): Form<RawSupplierFields>,
) -> Result<Response> {
    let suppliers = state.suppliers();
    let namespace = suppliers.resolve(&segment).await?;

    match suppliers.submit(&namespace, fields.clone()).await {
        Ok(record) => Ok((
            StatusCode::CREATED,
            SubmittedTemplate {
                namespace,
                supplier_name: record.name,
            },
        )
            .into_response()),
        Err(SupplierError::InvalidRecord(err)) => {
            tracing::info!(namespace = %namespace, error = %err, "Supplier submission rejected");
            Ok((
                StatusCode::BAD_REQUEST,
                SupplierFormTemplate {
                    namespace,
                    error: Some(format!("Please fill in the {} field.", field_label(&err))),
                    values: fields,
                },
            )
                .into_response())
        }
        Err(err) => Err(AppError::from(err)),
    }
}

/// Form label of the field named in a record error.
fn field_label(err: &supplierdb_core::RecordError) -> &'static str {
    match err {
        supplierdb_core::RecordError::MissingField(field) => match *field {
            "supplierID" => "Supplier ID",
            "name" => "Name",
            "company" => "Company",
            "email" => "Email",
            "company_phone_number" => "Company phone",
            "core_business" => "Core business",
            other => other,
        },
        supplierdb_core::RecordError::RowShape { .. } => "required",
    }
}
