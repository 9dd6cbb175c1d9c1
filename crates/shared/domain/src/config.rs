use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level website configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfigInner {
    pub environment: Environment,
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub security: SecurityConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into middlewares and handlers.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(flatten, default)]
    inner: Arc<WebConfigInner>,
}

impl Deref for WebConfig {
    type Target = WebConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for WebConfig {
    fn deref_mut(&mut self) -> &mut WebConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// The environment the app is running in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Upper bound for handling a single request.
    pub request_timeout_secs: u64,
    /// Grace period given to in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
    /// Compression quality (0-11, clamped by each algorithm).
    pub compression_level: i32,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Presentation settings shared by every page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    /// Public base URL (e.g. `https://immanent.tech`), used for absolute OpenGraph links.
    pub base_url: String,
    pub language: String,
}

/// Security knobs for the middleware stack.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub csp: CspConfig,
    pub cors: CorsConfig,
    pub csrf: CsrfConfig,
    pub rate_limit: RateLimitConfig,
}

/// Content-Security-Policy directives. Every list renders as `directive v1 v2 ...;`.
///
/// See <https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Headers/Content-Security-Policy>.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    pub base_uri: Vec<String>,
    pub child_src: Vec<String>,
    pub connect_src: Vec<String>,
    pub default_src: Vec<String>,
    pub font_src: Vec<String>,
    pub form_action: Vec<String>,
    /// Setting this to `'none'` is roughly equivalent to `X-Frame-Options: DENY`.
    pub frame_ancestors: Vec<String>,
    pub frame_src: Vec<String>,
    pub img_src: Vec<String>,
    pub manifest_src: Vec<String>,
    pub media_src: Vec<String>,
    pub object_src: Vec<String>,
    pub plugin_types: Vec<String>,
    pub prefetch_src: Vec<String>,
    pub report_to: Option<String>,
    /// Deprecated in CSP Level 3 in favour of `report-to`.
    pub report_uri: Option<String>,
    pub sandbox: Vec<String>,
    pub script_src: Vec<String>,
    pub script_src_attr: Vec<String>,
    pub style_src: Vec<String>,
    pub style_src_attr: Vec<String>,
    pub worker_src: Vec<String>,
    /// Append a per-request `'nonce-…'` source to `script-src` and `style-src`.
    pub nonce: bool,
}

/// Cross-Origin Resource Sharing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age_secs: u64,
}

/// Double-submit cookie CSRF protection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
    pub secure_cookie: bool,
    pub max_age_secs: u64,
}

/// Per-client token bucket rate limiting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst: u32,
    /// Header holding the proxy chain (rightmost non-private address wins).
    pub client_ip_header: String,
    pub exempt_paths: Vec<String>,
    /// Requests addressed to these hosts are never limited.
    pub trusted_hosts: Vec<String>,
    /// Upper bound on the number of tracked clients.
    pub max_clients: u64,
}

/// URLs of the browser modules imported by the bootstrap script.
///
/// Library sources outside `/content` must be allowed by `security.csp.script_src`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub htmx_src: String,
    pub htmx_extension_src: String,
    pub hyperscript_src: String,
}

/// Log output. The level itself is chosen on the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info,tower_http=debug`. Unset defers to `RUST_LOG`.
    pub filter: Option<String>,
    /// Directory of the rolling JSON log files.
    pub directory: PathBuf,
    pub rotation: LogRotation,
    /// Number of rotated files kept on disk.
    pub max_files: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            ssl: None,
            request_timeout_secs: 60,
            shutdown_timeout_secs: 30,
            compression_level: 5,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: crate::constants::APP_NAME.to_owned(),
            description: crate::constants::APP_DESCRIPTION.to_owned(),
            base_url: String::new(),
            language: "en".to_owned(),
        }
    }
}

impl Default for CspConfig {
    fn default() -> Self {
        let own = || vec!["'self'".to_owned()];
        Self {
            base_uri: own(),
            child_src: Vec::new(),
            connect_src: own(),
            default_src: own(),
            font_src: own(),
            form_action: own(),
            frame_ancestors: vec!["'none'".to_owned()],
            frame_src: Vec::new(),
            img_src: vec!["'self'".to_owned(), "data:".to_owned()],
            manifest_src: Vec::new(),
            media_src: Vec::new(),
            object_src: vec!["'none'".to_owned()],
            plugin_types: Vec::new(),
            prefetch_src: Vec::new(),
            report_to: None,
            report_uri: None,
            sandbox: Vec::new(),
            script_src: vec!["'self'".to_owned(), crate::constants::LIBRARY_ORIGIN.to_owned()],
            script_src_attr: Vec::new(),
            style_src: own(),
            style_src_attr: Vec::new(),
            worker_src: Vec::new(),
            nonce: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: Vec::new(), max_age_secs: 600 }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrf_token".to_owned(),
            header_name: "X-CSRF-Token".to_owned(),
            secure_cookie: true,
            max_age_secs: 365 * 24 * 60 * 60,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 5,
            burst: 5,
            client_ip_header: "X-Forwarded-For".to_owned(),
            exempt_paths: vec![
                "/livenessProbe".to_owned(),
                "/health-check".to_owned(),
                "/health".to_owned(),
            ],
            trusted_hosts: Vec::new(),
            max_clients: 100_000,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            htmx_src: crate::constants::HTMX_SRC.to_owned(),
            htmx_extension_src: crate::constants::HTMX_EXTENSION_PATH.to_owned(),
            hyperscript_src: crate::constants::HYPERSCRIPT_SRC.to_owned(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            directory: PathBuf::from("logs"),
            rotation: LogRotation::Daily,
            max_files: 10,
        }
    }
}
