use super::middleware::rate_limit::RateLimiter;
use imt_domain::config::WebConfig;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

#[derive(Debug)]
pub struct WebStateInner {
    pub config: WebConfig,
    pub limiter: RateLimiter,
    /// When the state was built, i.e. server start-up.
    pub started: Instant,
    pub version: &'static str,
}

/// State shared by the kernel middlewares.
#[derive(Debug, Clone)]
pub struct WebState {
    inner: Arc<WebStateInner>,
}

impl WebState {
    #[must_use]
    pub fn builder() -> WebStateBuilder {
        WebStateBuilder::default()
    }
}

impl Deref for WebState {
    type Target = WebStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct WebStateBuilder {
    config: Option<WebConfig>,
}

impl WebStateBuilder {
    #[must_use]
    pub fn config(mut self, config: WebConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Finalizes the state, sizing the rate limiter from the configuration.
    ///
    /// # Errors
    /// Returns [`StateError::Validation`] if no configuration was provided.
    pub fn build(self) -> Result<WebState, StateError> {
        let config = self.config.ok_or_else(|| StateError::Validation {
            message: "WebConfig not provided".into(),
            context: None,
        })?;
        let limiter = RateLimiter::new(&config.security.rate_limit);

        Ok(WebState {
            inner: Arc::new(WebStateInner {
                config,
                limiter,
                started: Instant::now(),
                version: env!("CARGO_PKG_VERSION"),
            }),
        })
    }
}
