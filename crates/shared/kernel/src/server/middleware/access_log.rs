use super::request_id;
use axum::extract::{ConnectInfo, MatchedPath, Request};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{Level, error, info, trace, warn};

/// Paths containing any of these fragments are not logged.
const IGNORED_FRAGMENTS: [&str; 2] = ["/content", "/favicon"];

fn is_ignored(path: &str) -> bool {
    IGNORED_FRAGMENTS.iter().any(|fragment| path.contains(fragment))
}

fn header_list(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per request: 5xx at `ERROR`, 4xx at `WARN`, everything else at `INFO`.
/// Request and response headers are added when `TRACE` is enabled.
pub async fn access_log(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_ignored(&path) {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().clone();
    let query = request.uri().query().map(str::to_owned);
    let route = request.extensions().get::<MatchedPath>().map(|p| p.as_str().to_owned());
    let ip = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0.ip());
    let id = request_id(request.headers()).map(str::to_owned);
    let request_headers =
        tracing::enabled!(Level::TRACE).then(|| header_list(request.headers()));

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    macro_rules! log_at {
        ($mac:ident) => {
            $mac!(
                method = %method,
                path,
                query,
                route,
                ip = ?ip,
                status = status.as_u16(),
                latency_ms,
                request_id = id,
                "{} {}",
                method,
                path
            )
        };
    }

    if status.is_server_error() {
        log_at!(error);
    } else if status.is_client_error() {
        log_at!(warn);
    } else {
        log_at!(info);
    }

    if let Some(request_headers) = request_headers {
        trace!(
            request_id = id,
            request_headers,
            response_headers = header_list(response.headers()),
            "Request headers"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn static_content_is_not_logged() {
        assert!(is_ignored("/content/styles.css"));
        assert!(is_ignored("/favicon.ico"));
        assert!(!is_ignored("/work"));
    }

    #[test]
    fn headers_render_as_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));
        headers.insert("accept", HeaderValue::from_static("text/html"));

        let rendered = header_list(&headers);
        assert!(rendered.contains("hx-request: true"));
        assert!(rendered.contains("accept: text/html"));
    }
}
