use imt_kernel::config::{load_config, validate};
use imt_kernel::domain::config::{Environment, LogRotation, WebConfig};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PORT_VAR: &str = "IMMANENT_TECH_WEB__SERVER__PORT";
const ORIGINS_VAR: &str = "IMMANENT_TECH_WEB__SECURITY__CORS__ALLOWED_ORIGINS";
const EXEMPT_VAR: &str = "IMMANENT_TECH_WEB__SECURITY__RATE_LIMIT__EXEMPT_PATHS";

/// Sets environment variables for the lifetime of the guard.
struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            // SAFETY: env-mutating tests are serialized.
            unsafe { std::env::set_var(key, value) };
        }
        Self(vars.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.0 {
            // SAFETY: env-mutating tests are serialized.
            unsafe { std::env::remove_var(key) };
        }
    }
}

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

const FILE: &str = r#"
environment = "development"

[server]
port = 9000
request_timeout_secs = 15

[site]
name = "From File"

[security.cors]
allowed_origins = ["https://file.example"]

[logging]
filter = "info,tower_http=debug"
rotation = "hourly"
max_files = 3
"#;

#[test]
#[serial]
fn file_values_are_loaded() {
    let (_dir, path) = write_config(FILE);

    let cfg: WebConfig = load_config(Some(&path)).unwrap();

    assert_eq!(cfg.environment, Environment::Development);
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.request_timeout_secs, 15);
    assert_eq!(cfg.site.name, "From File");
    assert_eq!(cfg.security.cors.allowed_origins, vec!["https://file.example".to_owned()]);
    assert_eq!(cfg.logging.filter.as_deref(), Some("info,tower_http=debug"));
    assert_eq!(cfg.logging.rotation, LogRotation::Hourly);
    assert_eq!(cfg.logging.max_files, 3);
    // Untouched sections keep their defaults.
    assert_eq!(cfg.logging.directory, PathBuf::from("logs"));
    assert_eq!(cfg.server.shutdown_timeout_secs, 30);
    assert!(validate(&cfg).is_ok());
}

#[test]
#[serial]
fn environment_overrides_file_and_splits_lists() {
    let (_dir, path) = write_config(FILE);
    let _env = EnvGuard::set(&[
        (PORT_VAR, "9100"),
        (ORIGINS_VAR, "https://a.example https://b.example"),
        (EXEMPT_VAR, "/health /metrics"),
    ]);

    let cfg: WebConfig = load_config(Some(&path)).unwrap();

    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.server.request_timeout_secs, 15);
    assert_eq!(
        cfg.security.cors.allowed_origins,
        vec!["https://a.example".to_owned(), "https://b.example".to_owned()]
    );
    assert_eq!(cfg.security.rate_limit.exempt_paths, vec!["/health".to_owned(), "/metrics".to_owned()]);
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let cfg: WebConfig = load_config(Some(dir.path().join("absent.toml"))).unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.environment, Environment::Production);
}

#[test]
#[serial]
fn malformed_values_are_rejected() {
    let (_dir, path) = write_config("[server]\nport = \"not a port\"\n");

    let err = load_config::<WebConfig>(Some(&path)).unwrap_err();

    assert!(err.to_string().contains("Failed to deserialize config"));
}

#[test]
#[serial]
fn validation_rejects_zero_port_from_environment() {
    let _env = EnvGuard::set(&[(PORT_VAR, "0")]);
    let dir = tempfile::tempdir().unwrap();

    let cfg: WebConfig = load_config(Some(dir.path().join("absent.toml"))).unwrap();
    let err = validate(&cfg).unwrap_err();

    assert!(err.to_string().contains("server.port"));
}
