use axum::body::{Body, HttpBody, to_bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Bodies that are larger, or of unknown size, are passed through untagged.
const MAX_BUFFERED_BODY: u64 = 16 * 1024 * 1024;

/// Weak validator `W/"<len hex>-<first 16 bytes of sha256 hex>"`.
///
/// The tag is computed on the identity body and shared by every content-coding the
/// compression layer may apply afterwards, so it is never strong.
pub fn entity_tag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    format!("W/\"{:x}-{}\"", body.len(), hex::encode(&digest.as_slice()[..16]))
}

fn is_bufferable(body: &Body) -> bool {
    body.size_hint().upper().is_some_and(|upper| upper <= MAX_BUFFERED_BODY)
}

/// Weak comparison against an `If-None-Match` list (RFC 9110 §13.1.2).
fn matches_any(if_none_match: &str, tag: &str) -> bool {
    let tag = tag.trim_start_matches("W/");
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == tag)
}

fn is_streaming(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/event-stream"))
}

/// Adds an `ETag` to successful `GET`/`HEAD` responses and answers matching
/// `If-None-Match` requests with `304 Not Modified`.
pub async fn etag(request: Request, next: Next) -> Response {
    let eligible = matches!(*request.method(), Method::GET | Method::HEAD)
        && !is_streaming(request.headers());
    if !eligible {
        return next.run(request).await;
    }

    let if_none_match = request
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let response = next.run(request).await;
    if !response.status().is_success() || response.headers().contains_key(header::ETAG) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    if !is_bufferable(&body) {
        return Response::from_parts(parts, body);
    }
    #[allow(clippy::cast_possible_truncation)]
    let bytes = match to_bytes(body, MAX_BUFFERED_BODY as usize).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to buffer response body for ETag");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    };

    let tag = entity_tag(&bytes);
    let Ok(value) = HeaderValue::from_str(&tag) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    if if_none_match.as_deref().is_some_and(|inm| matches_any(inm, &tag)) {
        let mut not_modified = StatusCode::NOT_MODIFIED.into_response();
        let headers = not_modified.headers_mut();
        headers.insert(header::ETAG, value);
        for name in [header::CACHE_CONTROL, header::VARY, header::EXPIRES, header::CONTENT_LOCATION] {
            if let Some(v) = parts.headers.get(&name) {
                headers.insert(name, v.clone());
            }
        }
        return not_modified;
    }

    parts.headers.insert(header::ETAG, value);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_weak_quoted_and_length_prefixed() {
        let tag = entity_tag(b"hello");
        assert!(tag.starts_with("W/\"5-"));
        assert!(tag.ends_with('"'));
        // 16 digest bytes as hex.
        assert_eq!(tag.len(), 2 + 1 + 1 + 1 + 32 + 1);
    }

    #[test]
    fn only_sized_bodies_within_limit_are_buffered() {
        assert!(is_bufferable(&Body::from("small")));
        assert!(!is_bufferable(&Body::from(vec![b'a'; 17 * 1024 * 1024])));
    }

    #[test]
    fn tag_depends_on_content() {
        assert_eq!(entity_tag(b"a"), entity_tag(b"a"));
        assert_ne!(entity_tag(b"a"), entity_tag(b"b"));
    }

    #[test]
    fn if_none_match_uses_weak_comparison() {
        let tag = entity_tag(b"body");
        assert!(matches_any(&tag, &tag));
        assert!(matches_any(&format!("\"other\", W/{tag}"), &tag));
        assert!(matches_any("*", &tag));
        assert!(!matches_any("\"other\"", &tag));
    }
}
