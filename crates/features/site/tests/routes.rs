use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use imt_domain::config::{AssetsConfig, CspConfig, WebConfig};
use imt_site::bootstrap::ScriptBundle;
use tower::ServiceExt;

fn app() -> Router {
    let site = imt_site::init(&WebConfig::default()).expect("site should initialize");
    imt_site::router(site)
}

async fn get(uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut request = Request::get(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    app().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

#[tokio::test]
async fn landing_is_a_full_document_with_one_bootstrap() {
    let response = get("/", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text(response).await;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<body hx-boost="true">"#));
    assert_eq!(html.matches(r#"<script type="module" src="/content/scripts.js""#).count(), 1);
}

#[tokio::test]
async fn htmx_requests_get_fragments_except_history_restores() {
    let fragment = text(get("/work", &[("HX-Request", "true")]).await).await;
    assert!(fragment.starts_with("<title>Work | "));
    assert!(!fragment.contains("<html"));

    let restore =
        text(get("/work", &[("HX-Request", "true"), ("HX-History-Restore-Request", "true")]).await).await;
    assert!(restore.starts_with("<!DOCTYPE html>"));
}

#[tokio::test]
async fn partials_require_htmx() {
    let plain = get("/partials/support", &[]).await;
    assert_eq!(plain.status(), StatusCode::FORBIDDEN);

    let hx = get("/partials/support", &[("HX-Request", "true")]).await;
    assert_eq!(hx.status(), StatusCode::OK);
    assert!(text(hx).await.contains("<h1>Support</h1>"));

    let unknown = get("/partials/admin", &[("HX-Request", "true")]).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bootstrap_module_is_served_from_memory() {
    let response = get("/content/scripts.js", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/javascript"));
    assert_eq!(header_value(&response, header::CACHE_CONTROL), "public, max-age=604800");

    let js = text(response).await;
    let htmx = js.find("htmx.org@").unwrap();
    let hyperscript = js.find("import _hyperscript").unwrap();
    assert!(htmx < hyperscript);
    assert!(js.trim_end().ends_with("_hyperscript.browserInit();"));
    assert_eq!(js.matches("browserInit").count(), 1);
}

#[tokio::test]
async fn default_bootstrap_imports_are_loadable() {
    let script_src = CspConfig::default().script_src;
    let bundle = ScriptBundle::standard(&AssetsConfig::default()).unwrap();

    for import in bundle.imports() {
        let src = import.src();
        if src.starts_with('/') {
            assert_eq!(get(src, &[]).await.status(), StatusCode::OK, "{src} is not served");
        } else {
            assert!(src.starts_with("https://"), "{src} is not pinned to https");
            assert!(
                script_src.iter().any(|origin| src.starts_with(&format!("{origin}/"))),
                "{src} is blocked by script-src {script_src:?}"
            );
        }
    }
}

#[tokio::test]
async fn htmx_extension_module_is_served() {
    let response = get("/content/htmx-ext.js", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("htmx:configRequest"));
}

#[tokio::test]
async fn static_content_cache_policies() {
    let css = get("/content/styles.css", &[]).await;
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(header_value(&css, header::CACHE_CONTROL), "public, max-age=604800");
    assert!(header_value(&css, header::CONTENT_TYPE).starts_with("text/css"));

    let logo = get("/content/logo.svg", &[]).await;
    assert_eq!(header_value(&logo, header::CACHE_CONTROL), "public, max-age=31536000, immutable");

    let missing = get("/content/missing.css", &[]).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let traversal = get("/content/../Cargo.toml", &[]).await;
    assert_eq!(traversal.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn robots_txt_is_served() {
    let response = get("/robots.txt", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CACHE_CONTROL), "public, max-age=604800, s-maxage=43200");
    assert!(text(response).await.contains("User-agent: *"));
}

#[tokio::test]
async fn unknown_paths_render_not_found_page() {
    let response = get("/nowhere", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text(response).await.contains("<h1>Not Found</h1>"));
}
