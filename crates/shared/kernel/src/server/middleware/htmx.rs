use crate::server::HxRequest;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use imt_domain::htmx::headers;

/// Marks every response as varying on the htmx request headers, so caches never serve a
/// fragment for a full page load (or the reverse).
pub async fn htmx_vary(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let vary = response.headers_mut();
    vary.append(header::VARY, HeaderValue::from_static(headers::REQUEST));
    vary.append(header::VARY, HeaderValue::from_static(headers::HISTORY_RESTORE_REQUEST));
    response
}

/// Only passes htmx requests through; everything else gets `403 Forbidden`.
pub async fn require_htmx(hx: HxRequest, request: Request, next: Next) -> Response {
    if !hx.request {
        return (StatusCode::FORBIDDEN, "Not allowed").into_response();
    }
    next.run(request).await
}
