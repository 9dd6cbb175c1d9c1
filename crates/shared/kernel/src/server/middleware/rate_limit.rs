use crate::security::client_ip;
use crate::server::WebState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use imt_domain::config::RateLimitConfig;
use moka::sync::Cache;
use parking_lot::Mutex;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Clients idle for this long are forgotten (their bucket would be full again anyway).
const CLIENT_IDLE: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    updated: Instant,
}

/// Per-client token buckets: `burst` tokens, refilled at `requests_per_second`.
pub struct RateLimiter {
    buckets: Cache<IpAddr, Arc<Mutex<TokenBucket>>>,
    rate: f64,
    burst: f64,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("clients", &self.buckets.entry_count())
            .field("rate", &self.rate)
            .field("burst", &self.burst)
            .finish()
    }
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            buckets: Cache::builder()
                .max_capacity(cfg.max_clients)
                .time_to_idle(CLIENT_IDLE)
                .build(),
            rate: f64::from(cfg.requests_per_second.max(1)),
            burst: f64::from(cfg.burst.max(1)),
        }
    }

    /// Takes one token for `client`; `false` means the request must be rejected.
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let bucket = self
            .buckets
            .get_with(client, || Arc::new(Mutex::new(TokenBucket { tokens: self.burst, updated: now })));
        let mut bucket = bucket.lock();

        let elapsed = now.saturating_duration_since(bucket.updated).as_secs_f64();
        bucket.tokens = elapsed.mul_add(self.rate, bucket.tokens).min(self.burst);
        bucket.updated = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(host, |(ip, _)| ip);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

fn request_host(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .map(strip_port)
}

fn is_exempt(state: &WebState, request: &Request) -> bool {
    let cfg = &state.config.security.rate_limit;
    if !cfg.enabled || state.config.environment.is_development() {
        return true;
    }
    if cfg.exempt_paths.iter().any(|p| p == request.uri().path()) {
        return true;
    }
    request_host(request)
        .is_some_and(|host| cfg.trusted_hosts.iter().any(|t| t.eq_ignore_ascii_case(host)))
}

/// Rejects clients exceeding their request budget with `429 Too Many Requests`.
///
/// Skipped in development, for exempt paths and for trusted hosts. Requests whose client
/// address cannot be determined are refused with `403 Forbidden`.
pub async fn rate_limit(State(state): State<WebState>, request: Request, next: Next) -> Response {
    if is_exempt(&state, &request) {
        return next.run(request).await;
    }

    let cfg = &state.config.security.rate_limit;
    let forwarded =
        request.headers().get(cfg.client_ip_header.as_str()).and_then(|v| v.to_str().ok());
    let peer = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0);

    let Some(client) = client_ip(forwarded, peer) else {
        error!(path = request.uri().path(), "Unable to determine client IP");
        return (StatusCode::FORBIDDEN, "I don't know who you are").into_response();
    };

    if !state.limiter.check(client) {
        warn!(client = %client, path = request.uri().path(), "Request rate-limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            "You have reached maximum request limit.",
        )
            .into_response();
    }

    next.run(request).await
}
