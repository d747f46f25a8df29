//! Request-scoped models for the web server.

pub mod session;

pub use session::{CurrentAccount, keys as session_keys};
