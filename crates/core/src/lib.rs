//! SupplierDB Core - Tenant namespaces, supplier records and storage ports.
//!
//! This crate provides the types shared by every SupplierDB component:
//! - `web` - Signup, supplier submission forms and spreadsheet export
//! - `cli` - Command-line tools for migrations and tenant management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. Storage backends implement the traits in [`ports`] and are
//! handed to the web layer at start-up.
//!
//! # Modules
//!
//! - [`types`] - Namespaces, supplier records, accounts, emails and IDs
//! - [`ports`] - The `TenantStore` and `UserDirectory` storage contracts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ports;
pub mod types;

pub use ports::*;
pub use types::*;
