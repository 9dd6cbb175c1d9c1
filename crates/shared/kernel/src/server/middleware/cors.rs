use axum::http::{HeaderName, HeaderValue, Method, header};
use imt_domain::config::SecurityConfig;
use imt_domain::htmx::headers;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

fn header_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<HeaderName> {
    names
        .into_iter()
        .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => Some(name),
            Err(e) => {
                warn!(header = name, error = %e, "Ignoring invalid CORS header name");
                None
            },
        })
        .collect()
}

/// `*` allows any origin by echoing the request's `Origin`, which stays valid with credentials.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|origin| origin.trim() == "*") {
        return AllowOrigin::mirror_request();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin, error = %e, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    AllowOrigin::list(origins)
}

/// Builds the CORS layer: configured origins with credentials, the htmx request headers allowed
/// and the htmx response headers exposed.
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let mut allowed = vec![header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE];
    allowed.extend(header_names(
        std::iter::once(security.csrf.header_name.as_str()).chain(headers::REQUEST_HEADERS.iter().copied()),
    ));

    let mut exposed = vec![header::LINK, HeaderName::from_static("accept-ch")];
    exposed.extend(header_names(headers::RESPONSE_HEADERS.iter().copied()));

    CorsLayer::new()
        .allow_origin(allowed_origins(&security.cors.allowed_origins))
        .allow_credentials(true)
        .allow_private_network(true)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers(allowed)
        .expose_headers(exposed)
        .max_age(Duration::from_secs(security.cors.max_age_secs))
}
