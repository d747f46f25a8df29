//! Authentication service.
//!
//! Company signup, password login and password reset over the storage ports.
//! Passwords are hashed with Argon2id; reset tokens are random and only their
//! SHA-256 digest is stored.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use supplierdb_core::{
    Account, AccountLookup, CredentialHash, DirectoryError, Email, EnsureOutcome, Namespace,
    NewAccount, TenantStore, UserDirectory,
};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes in a reset token.
const RESET_TOKEN_BYTES: usize = 32;

/// Signup form input.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub display_name: String,
    pub email: String,
    pub company_name: String,
    pub password: String,
}

/// A freshly issued password reset token.
///
/// `token` is the only copy of the plaintext; it goes into the emailed link.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub account: Account,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Borrows the ports from the application state for one request.
pub struct AuthService<'a> {
    directory: &'a dyn UserDirectory,
    tenants: &'a dyn TenantStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(directory: &'a dyn UserDirectory, tenants: &'a dyn TenantStore) -> Self {
        Self { directory, tenants }
    }

    // =========================================================================
    // Signup
    // =========================================================================

    /// Register a company: claim its namespace and create its account.
    ///
    /// The namespace is claimed with `ensure_namespace`, so of two concurrent
    /// signups whose company names derive to the same namespace exactly one
    /// succeeds. If account creation fails afterwards the namespace is
    /// released again.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField`, `InvalidEmail`, `InvalidCompanyName`
    /// or `WeakPassword` for bad input, `AuthError::DuplicateEmail` if the
    /// email is registered and `AuthError::CompanyTaken` if the namespace is.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Account, AuthError> {
        let display_name = required("name", &request.display_name)?;
        let company_name = required("company name", &request.company_name)?;
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;
        let namespace = Namespace::derive(company_name)?;

        let lookup = AccountLookup::Email(email.clone());
        if self.directory.find(&lookup).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let credential_hash = hash_password(&request.password)?;

        if self.tenants.ensure_namespace(&namespace).await? == EnsureOutcome::AlreadyExists {
            tracing::info!(namespace = %namespace, "Signup rejected: namespace taken");
            return Err(AuthError::CompanyTaken(namespace));
        }

        let new_account = NewAccount {
            display_name: display_name.to_owned(),
            email,
            company_name: company_name.to_owned(),
            namespace: namespace.clone(),
            credential_hash,
        };

        match self.directory.create_account(new_account).await {
            Ok(account) => {
                tracing::info!(
                    account_id = account.id.as_i32(),
                    namespace = %account.namespace,
                    "Company signed up"
                );
                Ok(account)
            }
            // The namespace belongs to an existing account; leave it in place.
            Err(err @ DirectoryError::NamespaceTaken(_)) => Err(err.into()),
            Err(err) => {
                if let Err(release_err) = self.tenants.release_namespace(&namespace).await {
                    tracing::error!(
                        namespace = %namespace,
                        error = %release_err,
                        "Failed to release namespace after signup failure"
                    );
                }
                Err(err.into())
            }
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with an email or company name and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no account matches the key
    /// or the password is wrong.
    pub async fn login(&self, key: &str, password: &str) -> Result<Account, AuthError> {
        let mut found = None;
        for lookup in AccountLookup::candidates(key.trim()) {
            found = self.directory.find(&lookup).await?;
            if found.is_some() {
                break;
            }
        }
        let account = found.ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.credential_hash)?;

        Ok(account)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Issue a reset token for the account registered under `email`.
    ///
    /// Returns `Ok(None)` for unknown emails so callers can respond the same
    /// way whether or not an account exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    pub async fn issue_reset_token(
        &self,
        email: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<IssuedResetToken>, AuthError> {
        let email = Email::parse(email)?;

        let Some(account) = self.directory.find(&AccountLookup::Email(email)).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires_at = now + ttl;
        self.directory
            .set_reset_token(&account.email, &token_digest(&token), expires_at)
            .await?;

        tracing::info!(account_id = account.id.as_i32(), "Password reset token issued");
        Ok(Some(IssuedResetToken {
            account,
            token,
            expires_at,
        }))
    }

    /// Set a new password using a reset token.
    ///
    /// The password is validated before the token is redeemed, so a rejected
    /// password leaves the token usable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` or `PasswordMismatch` for bad input
    /// and `AuthError::ResetExpiredOrInvalid` for a bad token.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        validate_password(password)?;
        if password != password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        let credential_hash = hash_password(password)?;

        let mut account = self
            .directory
            .consume_reset_token(&token_digest(token), now)
            .await?;
        self.directory
            .update_credential(account.id, &credential_hash)
            .await?;
        account.credential_hash = credential_hash;

        tracing::info!(account_id = account.id.as_i32(), "Password reset");
        Ok(account)
    }
}

/// Trimmed value of a required form field.
fn required<'s>(field: &'static str, value: &'s str) -> Result<&'s str, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(value)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<CredentialHash, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| CredentialHash::new(hash.to_string()))
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &CredentialHash) -> Result<(), AuthError> {
    let parsed_hash =
        PasswordHash::new(hash.as_str()).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a URL-safe reset token from 32 random bytes.
#[must_use]
pub fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Digest under which a reset token is stored.
#[must_use]
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryTenantStore, MemoryUserDirectory};

    fn signup_request(company: &str, email: &str) -> SignupRequest {
        SignupRequest {
            display_name: "Jane Doe".to_string(),
            email: email.to_string(),
            company_name: company.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_reset_token_shape() {
        let token = generate_reset_token();
        assert_eq!(URL_SAFE_NO_PAD.decode(&token).unwrap().len(), RESET_TOKEN_BYTES);
        assert_ne!(token, generate_reset_token());

        let digest = token_digest(&token);
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, token_digest(&token));
        assert_ne!(digest, token);
    }

    #[tokio::test]
    async fn test_signup_claims_namespace() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);

        let account = auth
            .signup(&signup_request("Acme Co", "Jane@Acme.com"))
            .await
            .unwrap();

        assert_eq!(account.namespace.as_str(), "acme-co");
        assert_eq!(account.email.as_str(), "jane@acme.com");
        assert_eq!(account.company_name, "Acme Co");
        assert_ne!(account.credential_hash.as_str(), "correct horse");
        assert!(tenants.namespace_exists(&account.namespace).await.unwrap());
    }

    #[tokio::test]
    async fn test_signup_rejects_colliding_company() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);

        auth.signup(&signup_request("Acme Co", "jane@acme.com"))
            .await
            .unwrap();
        let err = auth
            .signup(&signup_request("ACME  co", "bob@other.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::CompanyTaken(ns) if ns.as_str() == "acme-co"));
    }

    #[tokio::test]
    async fn test_concurrent_signups_exactly_one_wins() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);

        let first = signup_request("Acme Co", "jane@acme.com");
        let second = signup_request("acme   co", "bob@acme.com");
        let (a, b) = tokio::join!(auth.signup(&first), auth.signup(&second));

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(AuthError::CompanyTaken(_))))
        );
        assert_eq!(tenants.list_namespaces().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_keeps_namespace_free() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);

        auth.signup(&signup_request("Acme Co", "jane@acme.com"))
            .await
            .unwrap();
        let err = auth
            .signup(&signup_request("Other Co", "JANE@acme.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail));
        let other = Namespace::derive("Other Co").unwrap();
        assert!(!tenants.namespace_exists(&other).await.unwrap());
    }

    #[tokio::test]
    async fn test_signup_validates_input() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);

        let mut request = signup_request("   ", "jane@acme.com");
        assert!(matches!(
            auth.signup(&request).await,
            Err(AuthError::MissingField("company name"))
        ));

        request.company_name = "!!!".to_string();
        assert!(matches!(
            auth.signup(&request).await,
            Err(AuthError::InvalidCompanyName(_))
        ));

        request.company_name = "Acme".to_string();
        request.password = "short".to_string();
        assert!(matches!(
            auth.signup(&request).await,
            Err(AuthError::WeakPassword(_))
        ));

        assert!(tenants.list_namespaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_by_email_or_company() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);
        auth.signup(&signup_request("Acme Co", "jane@acme.com"))
            .await
            .unwrap();

        assert!(auth.login("jane@acme.com", "correct horse").await.is_ok());
        assert!(auth.login("  Acme Co ", "correct horse").await.is_ok());
        assert!(matches!(
            auth.login("acme co", "wrong password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_by_company_name_with_at_sign() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);
        auth.signup(&signup_request("A@B Trading", "jane@ab.com"))
            .await
            .unwrap();
        auth.signup(&signup_request("X@Y", "joe@xy.com")).await.unwrap();

        let account = auth.login("A@B Trading", "correct horse").await.unwrap();
        assert_eq!(account.namespace.as_str(), "ab-trading");
        let account = auth.login("x@y", "correct horse").await.unwrap();
        assert_eq!(account.namespace.as_str(), "xy");
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);
        auth.signup(&signup_request("Acme Co", "jane@acme.com"))
            .await
            .unwrap();
        let now = Utc::now();

        let issued = auth
            .issue_reset_token("jane@acme.com", Duration::minutes(60), now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(issued.expires_at, now + Duration::minutes(60));

        // A rejected password leaves the token usable.
        assert!(matches!(
            auth.reset_password(&issued.token, "new password", "other password", now)
                .await,
            Err(AuthError::PasswordMismatch)
        ));

        auth.reset_password(&issued.token, "new password", "new password", now)
            .await
            .unwrap();

        assert!(auth.login("jane@acme.com", "new password").await.is_ok());
        assert!(auth.login("jane@acme.com", "correct horse").await.is_err());
        assert!(matches!(
            auth.reset_password(&issued.token, "third password", "third password", now)
                .await,
            Err(AuthError::ResetExpiredOrInvalid)
        ));
    }

    #[tokio::test]
    async fn test_reset_token_expires() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);
        auth.signup(&signup_request("Acme Co", "jane@acme.com"))
            .await
            .unwrap();
        let now = Utc::now();

        let issued = auth
            .issue_reset_token("jane@acme.com", Duration::minutes(60), now)
            .await
            .unwrap()
            .unwrap();

        let later = now + Duration::minutes(61);
        assert!(matches!(
            auth.reset_password(&issued.token, "new password", "new password", later)
                .await,
            Err(AuthError::ResetExpiredOrInvalid)
        ));
    }

    #[tokio::test]
    async fn test_issue_reset_token_unknown_email() {
        let directory = MemoryUserDirectory::new();
        let tenants = MemoryTenantStore::new();
        let auth = AuthService::new(&directory, &tenants);

        let issued = auth
            .issue_reset_token("ghost@example.com", Duration::minutes(60), Utc::now())
            .await
            .unwrap();
        assert!(issued.is_none());
        assert!(matches!(
            auth.issue_reset_token("not-an-email", Duration::minutes(60), Utc::now())
                .await,
            Err(AuthError::InvalidEmail(_))
        ));
    }
}
