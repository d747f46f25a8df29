//! Business logic services for the web server.
//!
//! # Services
//!
//! - `auth` - Company signup, login and password reset
//! - `email` - Delivery of password reset links
//! - `export` - `.xlsx` encoding of supplier records
//! - `suppliers` - Supplier submissions and per-tenant record access

pub mod auth;
pub mod email;
pub mod export;
pub mod suppliers;

pub use auth::{AuthError, AuthService, SignupRequest};
pub use email::{EmailError, LogMailer, MemoryMailer, ResetMailer, ResetMessage, SmtpMailer};
pub use suppliers::{SupplierError, SupplierService};
