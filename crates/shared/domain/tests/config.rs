use imt_domain::config::{
    CspConfig, Environment, RateLimitConfig, ServerConfig, SiteConfig, WebConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8080);
    assert!(server.ssl.is_none());
    assert_eq!(server.compression_level, 5);

    let limiter = RateLimitConfig::default();
    assert!(limiter.enabled);
    assert_eq!(limiter.requests_per_second, 5);
    assert!(limiter.exempt_paths.iter().any(|p| p == "/livenessProbe"));

    let csp = CspConfig::default();
    assert!(csp.nonce);
    assert_eq!(csp.frame_ancestors, vec!["'none'".to_owned()]);

    let cfg = WebConfig::default();
    assert_eq!(cfg.environment, Environment::Production);
    assert_eq!(cfg.site.name, imt_domain::constants::APP_NAME);
}

#[test]
fn web_config_deserializes() {
    let raw = json!({
        "environment": "development",
        "server": { "address": "::", "port": 9000, "ssl": null },
        "site": { "base_url": "https://immanent.tech" },
        "security": {
            "cors": { "allowed_origins": ["https://immanent.tech"] },
            "rate_limit": { "requests_per_second": 20, "trusted_hosts": ["immanent.tech"] }
        },
        "assets": { "htmx_src": "https://cdn.example/htmx.esm.js" }
    });

    let cfg: WebConfig = serde_json::from_value(raw).expect("config deserialize");
    assert!(cfg.environment.is_development());
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.site.base_url, "https://immanent.tech");
    assert_eq!(cfg.site.language, SiteConfig::default().language);
    assert_eq!(cfg.security.cors.allowed_origins, vec!["https://immanent.tech".to_owned()]);
    assert_eq!(cfg.security.rate_limit.requests_per_second, 20);
    assert_eq!(cfg.security.rate_limit.burst, 5);
    assert_eq!(cfg.assets.htmx_src, "https://cdn.example/htmx.esm.js");
    assert_eq!(cfg.assets.htmx_extension_src, "/content/htmx-ext.js");
}

#[test]
fn config_mutation_does_not_leak_into_clones() {
    let original = WebConfig::default();
    let mut changed = original.clone();
    changed.server.port = 1234;

    assert_eq!(original.server.port, 8080);
    assert_eq!(changed.server.port, 1234);
}
