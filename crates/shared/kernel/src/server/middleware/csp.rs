use crate::security::generate_nonce;
use crate::server::{CspNonce, WebState};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use imt_domain::config::CspConfig;
use tracing::error;

/// Renders the policy in alphabetical directive order, each as `directive v1 v2;`.
///
/// When `nonce` is given it is appended as a `'nonce-…'` source to `script-src` and `style-src`,
/// but only where those directives are configured: an absent directive falls back to
/// `default-src`, which a nonce would silently tighten.
pub fn render_policy(csp: &CspConfig, nonce: Option<&str>) -> String {
    let nonce_source = nonce.map(|n| format!("'nonce-{n}'"));
    let with_nonce = |values: &[String]| -> Vec<String> {
        let mut values = values.to_vec();
        if let (false, Some(source)) = (values.is_empty(), &nonce_source) {
            values.push(source.clone());
        }
        values
    };

    let report_to = csp.report_to.iter().cloned().collect::<Vec<_>>();
    let report_uri = csp.report_uri.iter().cloned().collect::<Vec<_>>();

    let directives: [(&str, Vec<String>); 22] = [
        ("base-uri", csp.base_uri.clone()),
        ("child-src", csp.child_src.clone()),
        ("connect-src", csp.connect_src.clone()),
        ("default-src", csp.default_src.clone()),
        ("font-src", csp.font_src.clone()),
        ("form-action", csp.form_action.clone()),
        ("frame-ancestors", csp.frame_ancestors.clone()),
        ("frame-src", csp.frame_src.clone()),
        ("img-src", csp.img_src.clone()),
        ("manifest-src", csp.manifest_src.clone()),
        ("media-src", csp.media_src.clone()),
        ("object-src", csp.object_src.clone()),
        ("plugin-types", csp.plugin_types.clone()),
        ("prefetch-src", csp.prefetch_src.clone()),
        ("report-to", report_to),
        ("report-uri", report_uri),
        ("sandbox", csp.sandbox.clone()),
        ("script-src", with_nonce(&csp.script_src)),
        ("script-src-attr", csp.script_src_attr.clone()),
        ("style-src", with_nonce(&csp.style_src)),
        ("style-src-attr", csp.style_src_attr.clone()),
        ("worker-src", csp.worker_src.clone()),
    ];

    directives
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| format!("{name} {};", values.join(" ")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generates a nonce for the request, exposes it as [`CspNonce`] and sets the
/// `Content-Security-Policy` header unless the handler already did.
pub async fn content_security_policy(
    State(state): State<WebState>,
    mut request: Request,
    next: Next,
) -> Response {
    let nonce = match generate_nonce() {
        Ok(nonce) => nonce,
        Err(e) => {
            error!(error = %e, "Failed to generate CSP nonce");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to generate nonce").into_response();
        },
    };

    let csp = &state.config.security.csp;
    let policy = render_policy(csp, csp.nonce.then_some(nonce.as_str()));

    request.extensions_mut().insert(CspNonce(nonce));
    let mut response = next.run(request).await;

    if policy.is_empty() {
        return response;
    }
    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            response.headers_mut().entry(header::CONTENT_SECURITY_POLICY).or_insert(value);
        },
        Err(e) => error!(error = %e, "Content-Security-Policy is not a valid header value"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> CspConfig {
        CspConfig {
            base_uri: Vec::new(),
            connect_src: Vec::new(),
            default_src: Vec::new(),
            font_src: Vec::new(),
            form_action: Vec::new(),
            frame_ancestors: Vec::new(),
            img_src: Vec::new(),
            object_src: Vec::new(),
            script_src: Vec::new(),
            style_src: Vec::new(),
            ..CspConfig::default()
        }
    }

    #[test]
    fn empty_config_renders_nothing() {
        assert_eq!(render_policy(&empty(), Some("abc")), "");
    }

    #[test]
    fn directives_are_sorted_and_terminated() {
        let csp = CspConfig {
            script_src: vec!["'self'".to_owned()],
            default_src: vec!["'none'".to_owned()],
            report_uri: Some("/csp".to_owned()),
            ..empty()
        };

        assert_eq!(
            render_policy(&csp, None),
            "default-src 'none'; report-uri /csp; script-src 'self';"
        );
    }

    #[test]
    fn nonce_only_extends_configured_directives() {
        let csp = CspConfig { script_src: vec!["'self'".to_owned()], ..empty() };

        let policy = render_policy(&csp, Some("n0nce"));
        assert_eq!(policy, "script-src 'self' 'nonce-n0nce';");
        assert!(!policy.contains("style-src"));
    }

    #[test]
    fn default_policy_locks_down_framing() {
        let policy = render_policy(&CspConfig::default(), Some("x"));
        assert!(policy.contains("frame-ancestors 'none';"));
        assert!(policy.contains("script-src 'self' 'nonce-x';"));
        assert!(policy.contains("style-src 'self' 'nonce-x';"));
    }
}
