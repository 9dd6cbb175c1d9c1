use config::{Config, Environment, File};
use imt_domain::config::WebConfig;
use imt_domain::constants::ENV_PREFIX;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Keys whose environment values are space-separated lists.
/// Eg: `IMMANENT_TECH_WEB__SECURITY__CORS__ALLOWED_ORIGINS="https://a https://b"`.
const LIST_KEYS: &[&str] = &[
    "security.cors.allowed_origins",
    "security.rate_limit.exempt_paths",
    "security.rate_limit.trusted_hosts",
    "security.csp.base_uri",
    "security.csp.child_src",
    "security.csp.connect_src",
    "security.csp.default_src",
    "security.csp.font_src",
    "security.csp.form_action",
    "security.csp.frame_ancestors",
    "security.csp.frame_src",
    "security.csp.img_src",
    "security.csp.manifest_src",
    "security.csp.media_src",
    "security.csp.object_src",
    "security.csp.plugin_types",
    "security.csp.prefetch_src",
    "security.csp.sandbox",
    "security.csp.script_src",
    "security.csp.script_src_attr",
    "security.csp.style_src",
    "security.csp.style_src_attr",
    "security.csp.worker_src",
];

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
    #[error("Invalid config{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches human readable context to config failures.
pub trait ConfigErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError>;
}

impl<T> ConfigErrorExt<T> for Result<T, config::ConfigError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

impl<T> ConfigErrorExt<T> for Result<T, ConfigError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                ConfigError::Config { context: c, .. } | ConfigError::Validation { context: c, .. } => {
                    *c = Some(context.into());
                },
            }
            e
        })
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a file (e.g., `server.toml`) when it exists. If no path
///    is provided, it defaults to `"server"`.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with
///    `IMMANENT_TECH_WEB__`. Nested structures are accessed using double underscores (e.g.,
///    `IMMANENT_TECH_WEB__SERVER__PORT` maps to `server.port`). List values are separated by
///    spaces.
///
/// # Errors
/// This function will return an error if:
/// * The content of the file is not valid for its format.
/// * The merged sources do not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use imt_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let environment = LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .convert_case(config::Case::Snake)
            .try_parsing(true)
            .list_separator(" "),
        |env, key| env.with_list_parse_key(key),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(environment);

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Checks the values serde cannot express as types.
///
/// # Errors
/// Returns [`ConfigError::Validation`] naming the first offending setting.
pub fn validate(cfg: &WebConfig) -> Result<(), ConfigError> {
    let invalid = |message: &'static str| {
        Err(ConfigError::Validation { message: message.into(), context: None })
    };

    if cfg.server.port == 0 {
        return invalid("server.port must be greater than zero");
    }
    if cfg.server.request_timeout_secs == 0 {
        return invalid("server.request_timeout_secs must be greater than zero");
    }
    if cfg.server.shutdown_timeout_secs == 0 {
        return invalid("server.shutdown_timeout_secs must be greater than zero");
    }
    if !(0..=11).contains(&cfg.server.compression_level) {
        return invalid("server.compression_level must be between 0 and 11");
    }

    let limiter = &cfg.security.rate_limit;
    if limiter.enabled && (limiter.requests_per_second == 0 || limiter.burst == 0) {
        return invalid("security.rate_limit requests_per_second and burst must be non-zero");
    }
    if limiter.client_ip_header.trim().is_empty() {
        return invalid("security.rate_limit.client_ip_header cannot be empty");
    }

    let csrf = &cfg.security.csrf;
    if csrf.cookie_name.trim().is_empty() || csrf.header_name.trim().is_empty() {
        return invalid("security.csrf cookie_name and header_name cannot be empty");
    }

    let base_url = cfg.site.base_url.as_str();
    if !base_url.is_empty() && !base_url.starts_with("http://") && !base_url.starts_with("https://")
    {
        return invalid("site.base_url must be an http(s) URL");
    }

    if cfg.logging.max_files == 0 {
        return invalid("logging.max_files must be greater than zero");
    }

    Ok(())
}
