//! OpenGraph metadata rendered into every page head.
//!
//! <https://ogp.me/>

use crate::config::SiteConfig;
use std::collections::BTreeMap;

/// Path of the default share image, relative to the site base URL.
pub const DEFAULT_IMAGE_PATH: &str = "/content/logo.svg";

/// A single `og:*` property with optional extra element attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    pub value: String,
    pub attributes: BTreeMap<String, String>,
}

impl Property {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), attributes: BTreeMap::new() }
    }
}

/// The OpenGraph properties used by the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: Property,
    pub object_type: Property,
    pub url: Property,
    pub image: Property,
    pub description: Property,
}

impl Metadata {
    /// Creates metadata with every property defaulted from the site configuration.
    pub fn new(site: &SiteConfig) -> Self {
        let base = site.base_url.trim_end_matches('/');
        Self {
            title: Property::new(&site.name),
            object_type: Property::new("website"),
            url: Property::new(base),
            image: Property::new(format!("{base}{DEFAULT_IMAGE_PATH}")),
            description: Property::new(&site.description),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title.value = title.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description.value = description.into();
        self
    }

    #[must_use]
    pub fn with_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type.value = object_type.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url.value = url.into();
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image.value = image.into();
        self
    }

    /// Iterates `(property name, property)` pairs in rendering order.
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &Property)> {
        [
            ("og:title", &self.title),
            ("og:type", &self.object_type),
            ("og:url", &self.url),
            ("og:image", &self.image),
            ("og:description", &self.description),
        ]
        .into_iter()
    }
}
