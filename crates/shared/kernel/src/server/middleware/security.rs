use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

const CROSS_ORIGIN_RESOURCE_POLICY: &str = "cross-origin-resource-policy";
const CROSS_ORIGIN_EMBEDDER_POLICY: &str = "cross-origin-embedder-policy";
const CROSS_ORIGIN_OPENER_POLICY: &str = "cross-origin-opener-policy";

fn set_default(response: &mut Response, name: HeaderName, value: &'static str) {
    response.headers_mut().entry(name).or_insert(HeaderValue::from_static(value));
}

/// Adds response headers hardening against framing, MIME sniffing and referrer leaks.
/// Values set by handlers are kept.
///
/// <https://cheatsheetseries.owasp.org/cheatsheets/HTTP_Headers_Cheat_Sheet.html>
pub async fn general_security(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    set_default(&mut response, header::X_FRAME_OPTIONS, "DENY");
    set_default(&mut response, header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    set_default(&mut response, header::REFERRER_POLICY, "strict-origin-when-cross-origin");
    response
}

/// Adds the cross-origin isolation headers (CORP, COEP, COOP).
pub async fn cross_origin_protection(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    set_default(&mut response, HeaderName::from_static(CROSS_ORIGIN_RESOURCE_POLICY), "same-site");
    set_default(&mut response, HeaderName::from_static(CROSS_ORIGIN_EMBEDDER_POLICY), "credentialless");
    set_default(&mut response, HeaderName::from_static(CROSS_ORIGIN_OPENER_POLICY), "same-origin");
    response
}
