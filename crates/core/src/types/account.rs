//! Account types for the user directory.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Email, Namespace};

/// An opaque password hash produced by the credential hasher.
///
/// The directory stores and returns this value but never interprets it.
/// `Debug` is redacted so hashes do not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap an encoded hash string.
    #[must_use]
    pub const fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash([REDACTED])")
    }
}

/// A registered company account.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Name of the person who signed up.
    pub display_name: String,
    /// Login email, unique across the directory.
    pub email: Email,
    /// Company name exactly as entered at signup.
    pub company_name: String,
    /// Namespace derived from `company_name` at signup.
    pub namespace: Namespace,
    /// Password hash.
    pub credential_hash: CredentialHash,
    /// Digest of the outstanding password reset token, if any.
    pub reset_token_digest: Option<String>,
    /// When the outstanding reset token stops being valid.
    pub reset_expires_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub display_name: String,
    pub email: Email,
    pub company_name: String,
    pub namespace: Namespace,
    pub credential_hash: CredentialHash,
}

/// How to find an account: by login email or by company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    Email(Email),
    Company(Namespace),
}

impl AccountLookup {
    /// Interpret a login key typed by a user.
    ///
    /// Keys that parse as an email are treated as emails; anything else is a
    /// company name and is resolved through [`Namespace::derive`], so
    /// "ACME co" finds the account registered as "Acme Co".
    ///
    /// Returns `None` when the key cannot match any account.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::candidates(key).into_iter().next()
    }

    /// Every lookup a login key may refer to, most specific first.
    ///
    /// A key shaped like an email yields the email lookup followed by the
    /// company lookup, so a company registered as "A@B" can still log in by
    /// name.
    #[must_use]
    pub fn candidates(key: &str) -> Vec<Self> {
        let mut lookups = Vec::with_capacity(2);
        if key.contains('@')
            && let Ok(email) = Email::parse(key)
        {
            lookups.push(Self::Email(email));
        }
        if let Ok(namespace) = Namespace::derive(key) {
            lookups.push(Self::Company(namespace));
        }
        lookups
    }

    /// Whether `account` is the one this lookup refers to.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        match self {
            Self::Email(email) => &account.email == email,
            Self::Company(namespace) => &account.namespace == namespace,
        }
    }
}
