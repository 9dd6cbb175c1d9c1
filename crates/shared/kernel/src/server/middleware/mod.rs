//! The middleware stack. Each function is meant for `axum::middleware::from_fn` (or
//! `from_fn_with_state` with a [`WebState`](super::WebState)); layers built from configuration
//! are returned ready to use.

pub mod access_log;
pub mod compression;
pub mod cors;
pub mod csp;
pub mod csrf;
pub mod etag;
pub mod htmx;
pub mod rate_limit;
pub mod security;

/// Header carrying the request id generated at the edge of the stack.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub(crate) fn request_id(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok())
}
