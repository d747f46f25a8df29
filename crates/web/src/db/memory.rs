//! In-memory implementations of the storage ports.
//!
//! Each adapter keeps its state behind a single `tokio::sync::RwLock`, which
//! is what makes `ensure_namespace` and email uniqueness atomic here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use supplierdb_core::{
    Account, AccountId, AccountLookup, CredentialHash, DirectoryError, Email, EnsureOutcome,
    Namespace, NewAccount, SupplierRecord, TenantStore, TenantStoreError, UserDirectory,
};

/// Tenant store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<BTreeMap<Namespace, Vec<SupplierRecord>>>,
}

impl MemoryTenantStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn ensure_namespace(
        &self,
        namespace: &Namespace,
    ) -> Result<EnsureOutcome, TenantStoreError> {
        let mut tenants = self.tenants.write().await;
        if tenants.contains_key(namespace) {
            return Ok(EnsureOutcome::AlreadyExists);
        }
        tenants.insert(namespace.clone(), Vec::new());
        Ok(EnsureOutcome::Created)
    }

    async fn namespace_exists(&self, namespace: &Namespace) -> Result<bool, TenantStoreError> {
        Ok(self.tenants.read().await.contains_key(namespace))
    }

    async fn release_namespace(&self, namespace: &Namespace) -> Result<bool, TenantStoreError> {
        let mut tenants = self.tenants.write().await;
        match tenants.get(namespace) {
            Some(records) if records.is_empty() => {
                tenants.remove(namespace);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert(
        &self,
        namespace: &Namespace,
        record: &SupplierRecord,
    ) -> Result<(), TenantStoreError> {
        let mut tenants = self.tenants.write().await;
        let records = tenants
            .get_mut(namespace)
            .ok_or_else(|| TenantStoreError::UnknownNamespace(namespace.clone()))?;
        records.push(record.clone());
        Ok(())
    }

    async fn query_all(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<SupplierRecord>, TenantStoreError> {
        self.tenants
            .read()
            .await
            .get(namespace)
            .cloned()
            .ok_or_else(|| TenantStoreError::UnknownNamespace(namespace.clone()))
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, TenantStoreError> {
        Ok(self.tenants.read().await.keys().cloned().collect())
    }

    async fn ping(&self) -> Result<(), TenantStoreError> {
        Ok(())
    }
}

/// Account directory held in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(DirectoryError::DuplicateEmail);
        }
        if accounts.iter().any(|a| a.namespace == account.namespace) {
            return Err(DirectoryError::NamespaceTaken(account.namespace));
        }

        let id = i32::try_from(accounts.len() + 1)
            .map_err(|_| DirectoryError::Storage("account id space exhausted".to_string()))?;
        let created = Account {
            id: AccountId::new(id),
            display_name: account.display_name,
            email: account.email,
            company_name: account.company_name,
            namespace: account.namespace,
            credential_hash: account.credential_hash,
            reset_token_digest: None,
            reset_expires_at: None,
            created_at: Utc::now(),
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn find(&self, lookup: &AccountLookup) -> Result<Option<Account>, DirectoryError> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .find(|a| lookup.matches(a))
            .cloned())
    }

    async fn set_reset_token(
        &self,
        email: &Email,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| &a.email == email)
            .ok_or(DirectoryError::NotFound)?;
        account.reset_token_digest = Some(token_digest.to_owned());
        account.reset_expires_at = Some(expires_at);
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, DirectoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| {
                a.reset_token_digest.as_deref() == Some(token_digest)
                    && a.reset_expires_at.is_some_and(|expiry| expiry > now)
            })
            .ok_or(DirectoryError::ExpiredOrInvalid)?;
        account.reset_token_digest = None;
        account.reset_expires_at = None;
        Ok(account.clone())
    }

    async fn update_credential(
        &self,
        id: AccountId,
        credential_hash: &CredentialHash,
    ) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(DirectoryError::NotFound)?;
        account.credential_hash = credential_hash.clone();
        Ok(())
    }
}
