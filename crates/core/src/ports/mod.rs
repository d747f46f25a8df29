//! Storage ports.
//!
//! The web layer talks to storage only through these traits. Adapters
//! (`PostgreSQL` and in-memory) live in the web crate and are constructed once
//! at start-up, then passed down explicitly.

pub mod directory;
pub mod tenants;

pub use directory::{DirectoryError, UserDirectory};
pub use tenants::{EnsureOutcome, TenantStore, TenantStoreError};
