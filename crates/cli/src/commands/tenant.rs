//! Tenant inspection and export commands.

use std::path::PathBuf;

use thiserror::Error;

use supplierdb_core::{Namespace, NamespaceError, TenantStore, TenantStoreError};
use supplierdb_web::db::PgTenantStore;
use supplierdb_web::services::SupplierService;
use supplierdb_web::services::export::export_filename;
use supplierdb_web::services::SupplierError;

use super::{ConnectError, connect};

/// Errors that can occur during tenant commands.
#[derive(Debug, Error)]
pub enum TenantCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The company name has no usable namespace.
    #[error("Invalid company name: {0}")]
    InvalidName(#[from] NamespaceError),

    #[error("Database error: {0}")]
    Tenants(#[from] TenantStoreError),

    #[error("Export failed: {0}")]
    Export(#[from] SupplierError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Print every tenant namespace with its stored record count.
pub async fn list() -> Result<(), TenantCommandError> {
    let store = PgTenantStore::new(connect().await?);
    let counts = record_counts(&store).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<48}  {:>8}", "NAMESPACE", "RECORDS");
        for (namespace, count) in &counts {
            println!("{namespace:<48}  {count:>8}");
        }
    }

    tracing::info!(tenants = counts.len(), "Tenant listing complete");
    Ok(())
}

/// Every namespace with the number of records it holds, sorted by namespace.
async fn record_counts(
    store: &dyn TenantStore,
) -> Result<Vec<(Namespace, usize)>, TenantStoreError> {
    let mut counts = Vec::new();
    for namespace in store.list_namespaces().await? {
        let records = store.query_all(&namespace).await?.len();
        counts.push((namespace, records));
    }
    Ok(counts)
}

/// Print the namespace a company name derives to.
pub fn derive(company_name: &str) -> Result<(), TenantCommandError> {
    let namespace = derive_namespace(company_name)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{namespace}");
    }
    Ok(())
}

fn derive_namespace(company_name: &str) -> Result<Namespace, NamespaceError> {
    Namespace::derive(company_name)
}

/// Write a tenant's distinct records to an `.xlsx` file.
pub async fn export(namespace: &str, output: Option<PathBuf>) -> Result<(), TenantCommandError> {
    let namespace = derive_namespace(namespace)?;
    let store = PgTenantStore::new(connect().await?);

    let bytes = SupplierService::new(&store).export(&namespace).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(&namespace)));

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| TenantCommandError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(
        namespace = %namespace,
        path = %path.display(),
        bytes = bytes.len(),
        "Export written"
    );
    Ok(())
}
