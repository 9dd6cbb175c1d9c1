//! Application-wide constants.

/// The application name.
pub const APP_NAME: &str = "Immanent Tech Web";
/// The application name formatted for use as an ID (log file prefix, user agent, ...).
pub const APP_ID: &str = "www-immanent-tech";
/// The catch-line of the application.
pub const APP_DESCRIPTION: &str = "Immanent Tech Website.";
/// Prefix of every environment variable read by the application.
pub const ENV_PREFIX: &str = "IMMANENT_TECH_WEB";

/// Path prefix under which static content is served.
pub const CONTENT_PREFIX: &str = "/content";
/// Path of the bootstrap module loaded by every page.
pub const BOOTSTRAP_PATH: &str = "/content/scripts.js";
/// Path of the companion htmx extension module.
pub const HTMX_EXTENSION_PATH: &str = "/content/htmx-ext.js";
/// Name of the meta tag carrying the CSRF token for client-side scripts.
pub const CSRF_META_NAME: &str = "csrf-token";

/// Origin serving the pinned browser library builds.
pub const LIBRARY_ORIGIN: &str = "https://cdn.jsdelivr.net";
/// htmx 2 ES module build.
pub const HTMX_SRC: &str = "https://cdn.jsdelivr.net/npm/htmx.org@2.0.4/dist/htmx.esm.js";
/// hyperscript as an ES module whose default export is `_hyperscript`.
pub const HYPERSCRIPT_SRC: &str = "https://cdn.jsdelivr.net/npm/hyperscript.org@0.9.14/+esm";
