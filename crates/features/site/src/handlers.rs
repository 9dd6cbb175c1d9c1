use crate::assets::{CACHE_DEFAULT, CACHE_WEEK, Content, cache_control_for};
use crate::page::{RenderContext, render_document, render_fragment};
use crate::{Page, Site};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::middleware::from_fn;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use imt_domain::constants::{BOOTSTRAP_PATH, CONTENT_PREFIX, HTMX_EXTENSION_PATH};
use imt_kernel::server::RequestContext;
use imt_kernel::server::middleware::htmx::require_htmx;
use tracing::error;

const JAVASCRIPT: &str = "text/javascript; charset=utf-8";

pub(crate) fn router(site: Site) -> Router {
    let partials = Router::new()
        .route("/partials/{page}", get(partial))
        .route_layer(from_fn(require_htmx));

    Router::new()
        .route("/", get(landing))
        .route("/work", get(work))
        .route("/support", get(support))
        .route("/robots.txt", get(robots))
        .route("/content/{*path}", get(content))
        .merge(partials)
        .fallback(not_found)
        .with_state(site)
}

/// Full document for regular loads, body fragment for htmx requests.
fn render(site: &Site, ctx: &RequestContext, page: Page, status: StatusCode) -> Response {
    if ctx.htmx.wants_partial() {
        return (status, Html(render_fragment(&site.config.site, page))).into_response();
    }

    let render_ctx =
        RenderContext { nonce: ctx.nonce.as_deref(), csrf_token: ctx.csrf_token.as_deref() };
    match render_document(&site.config, page, render_ctx) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, page = page.path(), "Failed to render page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

async fn landing(State(site): State<Site>, ctx: RequestContext) -> Response {
    render(&site, &ctx, Page::Landing, StatusCode::OK)
}

async fn work(State(site): State<Site>, ctx: RequestContext) -> Response {
    render(&site, &ctx, Page::Work, StatusCode::OK)
}

async fn support(State(site): State<Site>, ctx: RequestContext) -> Response {
    render(&site, &ctx, Page::Support, StatusCode::OK)
}

async fn not_found(State(site): State<Site>, ctx: RequestContext) -> Response {
    render(&site, &ctx, Page::NotFound, StatusCode::NOT_FOUND)
}

async fn partial(State(site): State<Site>, Path(slug): Path<String>) -> Response {
    match Page::from_slug(&slug) {
        Some(page) => Html(render_fragment(&site.config.site, page)).into_response(),
        None => {
            (StatusCode::NOT_FOUND, Html(render_fragment(&site.config.site, Page::NotFound)))
                .into_response()
        },
    }
}

fn javascript(source: &str) -> Response {
    ([(header::CONTENT_TYPE, JAVASCRIPT), (header::CACHE_CONTROL, CACHE_WEEK)], source.to_owned())
        .into_response()
}

async fn content(State(site): State<Site>, Path(path): Path<String>) -> Response {
    let full = format!("{CONTENT_PREFIX}/{path}");
    if full == BOOTSTRAP_PATH {
        return javascript(&site.bootstrap);
    }
    if full == HTMX_EXTENSION_PATH {
        return javascript(&site.extension);
    }

    if path.split('/').any(|segment| segment == "..") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let Some(file) = Content::get(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    (
        [
            (header::CONTENT_TYPE, file.metadata.mimetype().to_owned()),
            (header::CACHE_CONTROL, cache_control_for(&path).to_owned()),
        ],
        file.data,
    )
        .into_response()
}

async fn robots() -> Response {
    let Some(file) = Content::get("robots.txt") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8"), (header::CACHE_CONTROL, CACHE_DEFAULT)], file.data)
        .into_response()
}
