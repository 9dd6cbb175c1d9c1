use super::WebState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    /// Status
    status: &'static str,
    /// Version
    version: &'static str,
    /// Uptime in seconds
    uptime: u64,
}

pub(super) async fn health_handler(State(state): State<WebState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: state.version,
        uptime: state.started.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}

/// Liveness heartbeat for load balancers.
pub(super) async fn heartbeat() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain"), (header::CACHE_CONTROL, "no-store")], ".")
}
