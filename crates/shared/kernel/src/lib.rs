//! Kernel utilities shared across slices.
//! Keep this crate focused: configuration loading, security primitives and, behind the `server`
//! feature, the shared HTTP state, request context and middleware stack.
//!
//! ## Config loading
//! ```rust,ignore
//! use imt_kernel::config::load_config;
//! use imt_kernel::domain::config::WebConfig;
//!
//! let cfg: WebConfig = load_config(Some("server")).unwrap();
//! ```
//!
//! ## Nonces
//! ```rust
//! let nonce = imt_kernel::security::generate_nonce().unwrap();
//! assert_eq!(nonce.len(), 24);
//! ```
pub mod config;
pub mod prelude;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

pub use imt_domain as domain;
