pub use crate::config::{ConfigError, ConfigErrorExt, load_config, validate};
pub use crate::domain::config::WebConfig;
pub use crate::security::SecurityError;
#[cfg(feature = "server")]
pub use crate::server::{RequestContext, WebState};
