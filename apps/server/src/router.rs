use axum::Router;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use imt_kernel::server::WebState;
use imt_kernel::server::middleware::{
    access_log::access_log, compression::compression_layer, cors::cors_layer,
    csp::content_security_policy, csrf::csrf_protect, etag::etag, htmx::htmx_vary,
    rate_limit::rate_limit, security::cross_origin_protection, security::general_security,
};
use imt_kernel::server::router::system_router;
use imt_site::Site;
use std::time::Duration;
use tower::{Layer, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Composes the system and site routes under the full middleware stack, outermost first.
/// Trailing slashes are trimmed before routing.
pub(crate) fn init(state: WebState, site: Site) -> NormalizePath<Router> {
    let cfg = state.config.clone();
    let system = system_router(state.clone());

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(access_log))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(cfg.server.request_timeout_secs),
        ))
        .layer(cors_layer(&cfg.security))
        .layer(from_fn(cross_origin_protection))
        .layer(from_fn_with_state(state.clone(), content_security_policy))
        .layer(from_fn(general_security))
        .layer(from_fn_with_state(state.clone(), csrf_protect))
        .layer(from_fn_with_state(state, rate_limit))
        .layer(compression_layer(cfg.server.compression_level))
        .layer(from_fn(etag))
        .layer(from_fn(htmx_vary));

    let app = Router::new().merge(system).merge(imt_site::router(site)).layer(middleware);

    NormalizePathLayer::trim_trailing_slash().layer(app)
}
