//! Port for per-tenant supplier record collections.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Namespace, SupplierRecord};

/// Errors raised by a [`TenantStore`].
#[derive(Debug, Error)]
pub enum TenantStoreError {
    /// The namespace was never created by a signup.
    #[error("unknown namespace: {0}")]
    UnknownNamespace(Namespace),

    /// The backend failed or timed out.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result of [`TenantStore::ensure_namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// This call created the namespace.
    Created,
    /// The namespace already existed; nothing changed.
    AlreadyExists,
}

/// Per-tenant storage of supplier records.
///
/// Each namespace maps to one homogeneous, append-only collection of
/// [`SupplierRecord`]s. Inserts never create namespaces: a namespace exists
/// only once [`TenantStore::ensure_namespace`] has been called for it.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Create the collection for `namespace` if it is absent.
    ///
    /// Idempotent and atomic: when several callers race on the same
    /// namespace exactly one observes [`EnsureOutcome::Created`].
    async fn ensure_namespace(&self, namespace: &Namespace)
    -> Result<EnsureOutcome, TenantStoreError>;

    /// Whether `namespace` has been created.
    async fn namespace_exists(&self, namespace: &Namespace) -> Result<bool, TenantStoreError>;

    /// Remove `namespace` if it holds no records.
    ///
    /// Returns `true` if the namespace was removed. Used to undo a namespace
    /// created during a signup that failed afterwards.
    async fn release_namespace(&self, namespace: &Namespace) -> Result<bool, TenantStoreError>;

    /// Append a record to the namespace's collection.
    ///
    /// Fails with [`TenantStoreError::UnknownNamespace`] if the namespace
    /// does not exist.
    async fn insert(
        &self,
        namespace: &Namespace,
        record: &SupplierRecord,
    ) -> Result<(), TenantStoreError>;

    /// Snapshot of every record in the namespace, in insertion order.
    ///
    /// Fails with [`TenantStoreError::UnknownNamespace`] if the namespace
    /// does not exist.
    async fn query_all(&self, namespace: &Namespace)
    -> Result<Vec<SupplierRecord>, TenantStoreError>;

    /// Every namespace that has been created, sorted.
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, TenantStoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), TenantStoreError>;
}
