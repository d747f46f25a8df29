//! Port for the shared account directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{Account, AccountId, AccountLookup, CredentialHash, Email, Namespace, NewAccount};

/// Errors raised by a [`UserDirectory`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// Another account already owns this namespace.
    #[error("namespace already has an account: {0}")]
    NamespaceTaken(Namespace),

    /// No account matched.
    #[error("account not found")]
    NotFound,

    /// The reset token is unknown, already used, or past its expiry.
    #[error("reset token is expired or invalid")]
    ExpiredOrInvalid,

    /// The backend failed or timed out.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Directory of company accounts.
///
/// Independent of tenant namespaces except for the namespace each account
/// records at signup. Credentials are only ever held as opaque hashes.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create an account.
    ///
    /// Fails with [`DirectoryError::DuplicateEmail`] if the (normalized) email
    /// is taken and with [`DirectoryError::NamespaceTaken`] if the namespace
    /// already belongs to an account.
    async fn create_account(&self, account: NewAccount) -> Result<Account, DirectoryError>;

    /// Find an account by email or by company namespace.
    async fn find(&self, lookup: &AccountLookup) -> Result<Option<Account>, DirectoryError>;

    /// Store the digest of a fresh reset token, replacing any previous one.
    ///
    /// Fails with [`DirectoryError::NotFound`] if no account has this email.
    async fn set_reset_token(
        &self,
        email: &Email,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError>;

    /// Redeem a reset token: clear it and return its account.
    ///
    /// Fails with [`DirectoryError::ExpiredOrInvalid`] if no account holds the
    /// digest or it expired at or before `now`. A token can be redeemed once.
    async fn consume_reset_token(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, DirectoryError>;

    /// Replace an account's credential hash.
    async fn update_credential(
        &self,
        id: AccountId,
        credential_hash: &CredentialHash,
    ) -> Result<(), DirectoryError>;
}
