//! HTTP middleware stack for the web server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Security headers (CSP, framing, sniffing, caching)
//! 3. `TraceLayer` (request span from [`make_request_span`])
//! 4. Request ID (record on the span, echo in the response)
//! 5. Session layer (tower-sessions)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAccount, RequireAccount, clear_current_account, set_current_account};
pub use request_id::{make_request_span, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, postgres_store};
