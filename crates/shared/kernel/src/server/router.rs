use super::{WebState, health};
use axum::Router;
use axum::routing::get;

/// Routes every deployment exposes regardless of the mounted slices.
pub fn system_router(state: WebState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health-check", get(health::heartbeat))
        .with_state(state)
}
