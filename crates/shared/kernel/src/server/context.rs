use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use imt_domain::htmx::headers;
use std::convert::Infallible;

/// Per-request CSP nonce, inserted by the CSP middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(pub String);

/// The CSRF token valid for this request, inserted by the CSRF middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

/// The htmx request headers relevant to response selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HxRequest {
    /// `HX-Request: true`
    pub request: bool,
    /// `HX-Boosted: true`
    pub boosted: bool,
    /// `HX-History-Restore-Request: true`
    pub history_restore: bool,
}

impl HxRequest {
    pub fn from_headers(map: &HeaderMap) -> Self {
        let flag = |name: &str| map.get(name).is_some_and(|v| v.as_bytes() == b"true");
        Self {
            request: flag(headers::REQUEST),
            boosted: flag(headers::BOOSTED),
            history_restore: flag(headers::HISTORY_RESTORE_REQUEST),
        }
    }

    /// Whether a body fragment should be returned instead of a full document. History restores
    /// replace the whole page and always get the full document.
    pub const fn wants_partial(self) -> bool {
        self.request && !self.history_restore
    }
}

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Everything a page handler needs from the middleware stack.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub nonce: Option<String>,
    pub csrf_token: Option<String>,
    pub htmx: HxRequest,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            nonce: parts.extensions.get::<CspNonce>().map(|n| n.0.clone()),
            csrf_token: parts.extensions.get::<CsrfToken>().map(|t| t.0.clone()),
            htmx: HxRequest::from_headers(&parts.headers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn history_restore_wants_full_document() {
        let mut map = HeaderMap::new();
        map.insert(headers::REQUEST, HeaderValue::from_static("true"));
        assert!(HxRequest::from_headers(&map).wants_partial());

        map.insert(headers::HISTORY_RESTORE_REQUEST, HeaderValue::from_static("true"));
        let hx = HxRequest::from_headers(&map);
        assert!(hx.request && hx.history_restore);
        assert!(!hx.wants_partial());
    }

    #[test]
    fn plain_requests_are_not_htmx() {
        let mut map = HeaderMap::new();
        map.insert(headers::REQUEST, HeaderValue::from_static("false"));
        assert_eq!(HxRequest::from_headers(&map), HxRequest::default());
    }
}
