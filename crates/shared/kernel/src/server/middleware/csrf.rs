use super::request_id;
use crate::security::{generate_token, token::is_well_formed, tokens_match};
use crate::server::{CsrfToken, WebState};
use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use imt_domain::config::CsrfConfig;
use std::net::SocketAddr;
use tracing::error;

/// Methods that never change state and therefore skip verification.
const SAFE_METHODS: [Method; 4] = [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE];

/// Finds the named cookie across every `Cookie` header.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(key, value)| (key == name).then_some(value))
}

fn set_cookie(cfg: &CsrfConfig, token: &str) -> Option<HeaderValue> {
    let secure = if cfg.secure_cookie { "; Secure" } else { "" };
    let cookie = format!(
        "{}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{secure}",
        cfg.cookie_name, cfg.max_age_secs
    );
    HeaderValue::from_str(&cookie).ok()
}

fn log_failure(request: &Request, reason: &'static str) {
    let headers = request.headers();
    let text = |name: header::HeaderName| {
        headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_owned()
    };

    error!(
        reason,
        method = %request.method(),
        host = %text(header::HOST),
        path = request.uri().path(),
        query = request.uri().query().unwrap_or_default(),
        route = ?request.extensions().get::<MatchedPath>().map(MatchedPath::as_str),
        ip = ?request.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0),
        referer = %text(header::REFERER),
        request_id = request_id(headers),
        "CSRF check failed"
    );
}

/// Double-submit cookie protection.
///
/// Every request gets a [`CsrfToken`]: the one from its cookie when well formed, otherwise a new
/// one that is set as a cookie on the response. Requests with unsafe methods must echo the
/// cookie token in the configured header, or they are rejected with `400 Bad Request`.
pub async fn csrf_protect(State(state): State<WebState>, mut request: Request, next: Next) -> Response {
    let cfg = &state.config.security.csrf;
    let existing = cookie_value(request.headers(), &cfg.cookie_name)
        .filter(|token| is_well_formed(token))
        .map(str::to_owned);

    if !SAFE_METHODS.contains(request.method()) {
        let submitted = request.headers().get(cfg.header_name.as_str()).and_then(|v| v.to_str().ok());
        let verified = match (&existing, submitted) {
            (Some(expected), Some(submitted)) => tokens_match(expected, submitted),
            _ => false,
        };
        if !verified {
            let reason = if existing.is_none() { "missing cookie token" } else { "token mismatch" };
            log_failure(&request, reason);
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    }

    let (token, issued) = match existing {
        Some(token) => (token, false),
        None => match generate_token() {
            Ok(token) => (token, true),
            Err(e) => {
                error!(error = %e, "Failed to generate CSRF token");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            },
        },
    };

    request.extensions_mut().insert(CsrfToken(token.clone()));
    let mut response = next.run(request).await;

    if issued {
        if let Some(cookie) = set_cookie(cfg, &token) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lookup_spans_pairs_and_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        headers.append(header::COOKIE, HeaderValue::from_static("csrf_token=abc=="));

        assert_eq!(cookie_value(&headers, "lang"), Some("en"));
        assert_eq!(cookie_value(&headers, "csrf_token"), Some("abc=="));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookie_attributes_follow_config() {
        let cfg = CsrfConfig { secure_cookie: false, ..CsrfConfig::default() };
        let cookie = set_cookie(&cfg, "tok").unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("csrf_token=tok; Path=/;"));
        assert!(cookie.contains("HttpOnly; SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }
}
