//! Supplier submissions and per-tenant record access.

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use supplierdb_core::{
    Namespace, RawSupplierFields, RecordError, SupplierRecord, TenantStore, TenantStoreError,
    dedupe,
};

use super::export::encode_workbook;

/// Errors from supplier operations.
#[derive(Debug, Error)]
pub enum SupplierError {
    /// No tenant owns this path segment.
    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    /// The submitted record is incomplete.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// Tenant store failure.
    #[error("tenant store error: {0}")]
    Storage(TenantStoreError),

    /// Workbook encoding failed.
    #[error("export error: {0}")]
    Export(#[from] XlsxError),
}

impl From<TenantStoreError> for SupplierError {
    fn from(err: TenantStoreError) -> Self {
        match err {
            TenantStoreError::UnknownNamespace(ns) => Self::UnknownTenant(ns.into_inner()),
            other => Self::Storage(other),
        }
    }
}

/// Supplier service over the tenant store.
pub struct SupplierService<'a> {
    tenants: &'a dyn TenantStore,
}

impl<'a> SupplierService<'a> {
    /// Create a new supplier service.
    #[must_use]
    pub const fn new(tenants: &'a dyn TenantStore) -> Self {
        Self { tenants }
    }

    /// Resolve a URL path segment to an existing tenant namespace.
    ///
    /// # Errors
    ///
    /// Returns `SupplierError::UnknownTenant` if the segment derives to no
    /// namespace or to one that was never created.
    pub async fn resolve(&self, segment: &str) -> Result<Namespace, SupplierError> {
        let namespace = Namespace::derive(segment)
            .map_err(|_| SupplierError::UnknownTenant(segment.to_owned()))?;

        if !self.tenants.namespace_exists(&namespace).await? {
            return Err(SupplierError::UnknownTenant(namespace.into_inner()));
        }
        Ok(namespace)
    }

    /// Validate and store a submitted record.
    ///
    /// # Errors
    ///
    /// Returns `SupplierError::InvalidRecord` if a required field is missing
    /// and `SupplierError::UnknownTenant` if the namespace does not exist.
    pub async fn submit(
        &self,
        namespace: &Namespace,
        raw: RawSupplierFields,
    ) -> Result<SupplierRecord, SupplierError> {
        let record = SupplierRecord::normalize(raw)?;
        self.tenants.insert(namespace, &record).await?;

        tracing::info!(
            namespace = %namespace,
            supplier_id = %record.supplier_id,
            "Supplier record submitted"
        );
        Ok(record)
    }

    /// Every distinct record of a tenant, in submission order.
    ///
    /// # Errors
    ///
    /// Returns `SupplierError::UnknownTenant` if the namespace does not exist.
    pub async fn records(&self, namespace: &Namespace) -> Result<Vec<SupplierRecord>, SupplierError> {
        let records = self.tenants.query_all(namespace).await?;
        Ok(dedupe(records))
    }

    /// A tenant's distinct records encoded as an `.xlsx` workbook.
    ///
    /// # Errors
    ///
    /// Returns `SupplierError::UnknownTenant` if the namespace does not exist
    /// and `SupplierError::Export` if encoding fails.
    pub async fn export(&self, namespace: &Namespace) -> Result<Vec<u8>, SupplierError> {
        let records = self.records(namespace).await?;
        let bytes = encode_workbook(&records)?;

        tracing::info!(
            namespace = %namespace,
            records = records.len(),
            bytes = bytes.len(),
            "Supplier export generated"
        );
        Ok(bytes)
    }
}
