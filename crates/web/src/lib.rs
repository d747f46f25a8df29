//! SupplierDB web library.
//!
//! This crate provides the web server as a library so the router can be
//! built over any storage adapters and driven directly in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use state::AppState;

/// Build the complete application router.
///
/// Layers, innermost first: sessions, request IDs, request tracing, security
/// headers and finally Sentry so the whole request is covered.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
