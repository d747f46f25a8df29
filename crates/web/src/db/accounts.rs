//! `PostgreSQL` account directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use supplierdb_core::{
    Account, AccountId, AccountLookup, CredentialHash, DirectoryError, Email, Namespace,
    NewAccount, UserDirectory,
};

use super::{RepositoryError, violated_unique_constraint};

/// Unique constraints on `supplierdb.account`, named in the migration.
const EMAIL_UNIQUE: &str = "account_email_key";
const NAMESPACE_UNIQUE: &str = "account_namespace_key";

const ACCOUNT_COLUMNS: &str = "id, display_name, email, company_name, namespace, \
     credential_hash, reset_token_digest, reset_expires_at, created_at";

/// Row shape of `supplierdb.account`.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    display_name: String,
    email: String,
    company_name: String,
    namespace: String,
    credential_hash: String,
    reset_token_digest: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let namespace = Namespace::parse(&row.namespace).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid namespace in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            display_name: row.display_name,
            email,
            company_name: row.company_name,
            namespace,
            credential_hash: CredentialHash::new(row.credential_hash),
            reset_token_digest: row.reset_token_digest,
            reset_expires_at: row.reset_expires_at,
            created_at: row.created_at,
        })
    }
}

/// Directory error for a unique violation on `constraint`, if it is a
/// uniqueness rule of the directory itself.
fn unique_conflict(constraint: &str, namespace: &Namespace) -> Option<DirectoryError> {
    match constraint {
        EMAIL_UNIQUE => Some(DirectoryError::DuplicateEmail),
        NAMESPACE_UNIQUE => Some(DirectoryError::NamespaceTaken(namespace.clone())),
        _ => None,
    }
}

/// Account directory backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create an account directory over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let row: AccountRow = sqlx::query_as(&format!(
            r"
            INSERT INTO supplierdb.account
                (display_name, email, company_name, namespace, credential_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(&account.display_name)
        .bind(&account.email)
        .bind(&account.company_name)
        .bind(&account.namespace)
        .bind(account.credential_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let conflict = violated_unique_constraint(&e)
                .and_then(|constraint| unique_conflict(constraint, &account.namespace));
            conflict.unwrap_or_else(|| RepositoryError::Database(e).into())
        })?;

        Ok(Account::try_from(row)?)
    }

    async fn find(&self, lookup: &AccountLookup) -> Result<Option<Account>, DirectoryError> {
        let (column, key) = match lookup {
            AccountLookup::Email(email) => ("email", email.as_str()),
            AccountLookup::Company(namespace) => ("namespace", namespace.as_str()),
        };
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM supplierdb.account WHERE {column} = $1");

        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        match row {
            Some(r) => Ok(Some(Account::try_from(r)?)),
            None => Ok(None),
        }
    }

    async fn set_reset_token(
        &self,
        email: &Email,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            r"
            UPDATE supplierdb.account
            SET reset_token_digest = $2, reset_expires_at = $3
            WHERE email = $1
            ",
        )
        .bind(email)
        .bind(token_digest)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, DirectoryError> {
        // Clearing the digest in the same statement makes the token single-use
        // even when two redemptions race.
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            r"
            UPDATE supplierdb.account
            SET reset_token_digest = NULL, reset_expires_at = NULL
            WHERE reset_token_digest = $1 AND reset_expires_at > $2
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(token_digest)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let row = row.ok_or(DirectoryError::ExpiredOrInvalid)?;
        Ok(Account::try_from(row)?)
    }

    async fn update_credential(
        &self,
        id: AccountId,
        credential_hash: &CredentialHash,
    ) -> Result<(), DirectoryError> {
        let result =
            sqlx::query("UPDATE supplierdb.account SET credential_hash = $2 WHERE id = $1")
                .bind(id)
                .bind(credential_hash.as_str())
                .execute(&self.pool)
                .await
                .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}
