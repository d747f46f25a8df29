//! Request ID middleware for request tracing and correlation.
//!
//! An `x-request-id` supplied by an upstream proxy is reused; otherwise a
//! UUID v4 is generated. The ID is recorded on the request span created by
//! [`make_request_span`], tagged on the Sentry scope and echoed in the
//! response headers.

use axum::{
    extract::Request,
    http::{HeaderValue, header::HeaderName},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest upstream request ID that is trusted as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Build the per-request span used by `TraceLayer`.
///
/// Declares the fields that later middleware and extractors record into.
pub fn make_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
        account_id = tracing::field::Empty,
    )
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
