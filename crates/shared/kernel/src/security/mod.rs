//! Security primitives used by the middleware stack.

mod client_ip;
mod privileges;
pub(crate) mod token;

pub use client_ip::{client_ip, is_public};
pub use privileges::{ensure_unprivileged, ensure_unprivileged_ids};
pub use token::{generate_nonce, generate_token, tokens_match};

use std::borrow::Cow;

/// Errors raised by the security primitives.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// The operating system random source failed.
    #[error("Random source error{}: {source}", format_context(.context))]
    Random { source: getrandom::Error, context: Option<Cow<'static, str>> },
    /// The process runs with more privileges than it should.
    #[error("Privilege error{}: {message}", format_context(.context))]
    Privileged { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<getrandom::Error> for SecurityError {
    fn from(source: getrandom::Error) -> Self {
        Self::Random { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
