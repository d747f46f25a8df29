//! `PostgreSQL` tenant store.
//!
//! Namespaces live in a registry table; every supplier record references its
//! namespace through a foreign key. Queries are built at runtime so the crate
//! compiles without a live database.

use async_trait::async_trait;
use sqlx::PgPool;

use supplierdb_core::{EnsureOutcome, Namespace, SupplierRecord, TenantStore, TenantStoreError};

use super::RepositoryError;

/// Row shape of `supplierdb.supplier_record`.
#[derive(sqlx::FromRow)]
struct SupplierRow {
    supplier_id: String,
    name: String,
    company: String,
    email: String,
    company_phone: String,
    mobile_phone: Option<String>,
    core_business: String,
    website: Option<String>,
    postcode: Option<String>,
}

impl From<SupplierRow> for SupplierRecord {
    fn from(row: SupplierRow) -> Self {
        Self {
            supplier_id: row.supplier_id,
            name: row.name,
            company: row.company,
            email: row.email,
            company_phone: row.company_phone,
            mobile_phone: row.mobile_phone,
            core_business: row.core_business,
            website: row.website,
            postcode: row.postcode,
        }
    }
}

/// Tenant store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    /// Create a tenant store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, namespace: &Namespace) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM supplierdb.tenant WHERE namespace = $1)",
        )
        .bind(namespace)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn ensure_namespace(
        &self,
        namespace: &Namespace,
    ) -> Result<EnsureOutcome, TenantStoreError> {
        // Only the inserting transaction gets a row back.
        let created: Option<String> = sqlx::query_scalar(
            r"
            INSERT INTO supplierdb.tenant (namespace)
            VALUES ($1)
            ON CONFLICT (namespace) DO NOTHING
            RETURNING namespace
            ",
        )
        .bind(namespace)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let outcome = if created.is_some() {
            EnsureOutcome::Created
        } else {
            EnsureOutcome::AlreadyExists
        };
        tracing::debug!(namespace = %namespace, ?outcome, "Ensured namespace");
        Ok(outcome)
    }

    async fn namespace_exists(&self, namespace: &Namespace) -> Result<bool, TenantStoreError> {
        Ok(self.exists(namespace).await?)
    }

    async fn release_namespace(&self, namespace: &Namespace) -> Result<bool, TenantStoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM supplierdb.tenant t
            WHERE t.namespace = $1
              AND NOT EXISTS (
                  SELECT 1 FROM supplierdb.supplier_record r WHERE r.namespace = t.namespace
              )
            ",
        )
        .bind(namespace)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert(
        &self,
        namespace: &Namespace,
        record: &SupplierRecord,
    ) -> Result<(), TenantStoreError> {
        // Selecting from the registry makes the insert a no-op for unknown
        // namespaces instead of a foreign key failure.
        let result = sqlx::query(
            r"
            INSERT INTO supplierdb.supplier_record
                (namespace, supplier_id, name, company, email, company_phone,
                 mobile_phone, core_business, website, postcode)
            SELECT t.namespace, $2, $3, $4, $5, $6, $7, $8, $9, $10
            FROM supplierdb.tenant t
            WHERE t.namespace = $1
            ",
        )
        .bind(namespace)
        .bind(&record.supplier_id)
        .bind(&record.name)
        .bind(&record.company)
        .bind(&record.email)
        .bind(&record.company_phone)
        .bind(&record.mobile_phone)
        .bind(&record.core_business)
        .bind(&record.website)
        .bind(&record.postcode)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(TenantStoreError::UnknownNamespace(namespace.clone()));
        }
        Ok(())
    }

    async fn query_all(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<SupplierRecord>, TenantStoreError> {
        if !self.exists(namespace).await? {
            return Err(TenantStoreError::UnknownNamespace(namespace.clone()));
        }

        let rows: Vec<SupplierRow> = sqlx::query_as(
            r"
            SELECT supplier_id, name, company, email, company_phone,
                   mobile_phone, core_business, website, postcode
            FROM supplierdb.supplier_record
            WHERE namespace = $1
            ORDER BY id
            ",
        )
        .bind(namespace)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(SupplierRecord::from).collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, TenantStoreError> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT namespace FROM supplierdb.tenant ORDER BY namespace")
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::from)?;

        let namespaces = rows
            .iter()
            .map(|ns| parse_namespace(ns))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(namespaces)
    }

    async fn ping(&self) -> Result<(), TenantStoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}

fn parse_namespace(raw: &str) -> Result<Namespace, RepositoryError> {
    Namespace::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid namespace in database: {e}")))
}
