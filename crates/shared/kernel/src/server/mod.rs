//! Shared HTTP plumbing: state, request context, health endpoints and middlewares.

mod context;
mod health;
pub mod middleware;
pub mod router;
mod state;

pub use context::{CspNonce, CsrfToken, HxRequest, RequestContext};
pub use state::{StateError, WebState, WebStateBuilder, WebStateInner};
