//! Website feature slice: the bootstrap module, page rendering, embedded content and routes.

pub mod bootstrap;
mod error;
pub mod page;
pub mod pages;

#[cfg(feature = "server")]
pub mod assets;
#[cfg(feature = "server")]
mod handlers;

pub use crate::error::{SiteError, SiteErrorExt};
pub use crate::pages::Page;

use crate::bootstrap::{ScriptBundle, render_extension};
use imt_domain::config::WebConfig;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug)]
pub struct SiteInner {
    pub config: WebConfig,
    /// Rendered bootstrap module.
    pub bootstrap: String,
    /// Rendered companion htmx extension module.
    pub extension: String,
}

/// Site feature state
#[derive(Debug, Clone)]
pub struct Site {
    inner: Arc<SiteInner>,
}

impl Site {
    pub fn new(inner: SiteInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for Site {
    type Target = SiteInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Initialize the site feature: renders the bootstrap and extension modules once.
///
/// # Errors
/// Returns [`SiteError::Bootstrap`] if the configured asset sources cannot form a valid bundle.
pub fn init(config: &WebConfig) -> Result<Site, SiteError> {
    let bundle = ScriptBundle::standard(&config.assets).context("standard bundle")?;
    let extension = render_extension(&config.security.csrf.header_name).context("htmx extension")?;

    tracing::info!(imports = bundle.imports().len(), "Site slice initialized");

    Ok(Site::new(SiteInner { config: config.clone(), bootstrap: bundle.render(), extension }))
}

/// The site routes with the slice state applied. Includes the not-found fallback.
#[cfg(feature = "server")]
pub fn router(site: Site) -> axum::Router {
    handlers::router(site)
}
