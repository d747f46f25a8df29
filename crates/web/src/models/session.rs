//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use supplierdb_core::{Account, AccountId, Email, Namespace};

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the logged-in company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    /// Account's database ID.
    pub id: AccountId,
    /// Login email.
    pub email: Email,
    /// Company name as entered at signup.
    pub company_name: String,
    /// Namespace holding the company's supplier records.
    pub namespace: Namespace,
}

impl From<&Account> for CurrentAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            company_name: account.company_name.clone(),
            namespace: account.namespace.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in account.
    pub const CURRENT_ACCOUNT: &str = "current_account";
}
