//! Core types for SupplierDB.
//!
//! This module provides type-safe wrappers for the tenant and supplier domain.

pub mod account;
pub mod email;
pub mod id;
pub mod namespace;
pub mod supplier;

pub use account::{Account, AccountLookup, CredentialHash, NewAccount};
pub use email::{Email, EmailError};
pub use id::*;
pub use namespace::{Namespace, NamespaceError};
pub use supplier::{
    EXPORT_COLUMNS, ExportColumn, ExportRow, RawSupplierFields, RecordError, SupplierRecord, dedupe,
};
