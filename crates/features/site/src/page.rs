use crate::error::{SiteError, SiteErrorExt};
use crate::pages::Page;
use imt_domain::config::{SiteConfig, WebConfig};
use imt_domain::constants::{BOOTSTRAP_PATH, CONTENT_PREFIX, CSRF_META_NAME};
use imt_domain::htmx::HtmxConfig;
use imt_domain::opengraph::Metadata;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Per-request values the layout embeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'a> {
    pub nonce: Option<&'a str>,
    pub csrf_token: Option<&'a str>,
}

/// Escapes text for HTML element content and double- or single-quoted attributes.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn page_title(site: &SiteConfig, page: Page) -> String {
    format!("{} | {}", page.title(), site.name)
}

/// The swappable part of a page: title, header and main content.
///
/// This is what htmx requests receive; boosted navigation replaces the body with it and takes
/// the document title from the `<title>` element.
pub fn render_fragment(site: &SiteConfig, page: Page) -> String {
    let mut nav = String::new();
    for item in Page::NAVIGABLE {
        let current = if item == page { r#" aria-current="page""# } else { "" };
        let _ = write!(nav, r#"<a href="{}"{current}>{}</a>"#, item.path(), item.title());
    }

    format!(
        r##"<title>{title}</title>
<header class="site-header">
  <a class="brand" href="/">{name}</a>
  <button type="button" class="menu-toggle" aria-controls="site-nav" _="on click toggle .open on #site-nav">Menu</button>
  <nav id="site-nav">{nav}</nav>
</header>
<main id="content">
{content}
</main>"##,
        title = escape(&page_title(site, page)),
        name = escape(&site.name),
        content = page.content(),
    )
}

fn opengraph(site: &SiteConfig, page: Page) -> String {
    let base = site.base_url.trim_end_matches('/');
    let mut metadata = Metadata::new(site)
        .with_title(page_title(site, page))
        .with_url(format!("{base}{}", page.path()));
    if let Some(description) = page.description() {
        metadata = metadata.with_description(description);
    }

    let mut out = String::new();
    for (name, property) in metadata.properties() {
        let _ = write!(out, r#"<meta property="{name}" content="{}""#, escape(&property.value));
        for (key, value) in &property.attributes {
            let _ = write!(out, r#" {}="{}""#, escape(key), escape(value));
        }
        out.push_str(">\n");
    }
    out
}

/// The complete document: head with metadata, the htmx configuration and the single bootstrap
/// module script, then the page fragment inside a boosted body.
///
/// # Errors
/// Returns [`SiteError::Render`] if the htmx configuration cannot be serialized.
pub fn render_document(config: &WebConfig, page: Page, ctx: RenderContext<'_>) -> Result<String, SiteError> {
    let site = &config.site;

    let mut htmx = HtmxConfig::default();
    if let Some(nonce) = ctx.nonce {
        htmx = htmx.with_nonce(nonce);
    }
    let htmx = serde_json::to_string(&htmx).context("htmx-config")?;

    let nonce = ctx.nonce.map(|n| format!(r#" nonce="{}""#, escape(n))).unwrap_or_default();
    let description = page.description().unwrap_or(site.description.as_str());

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="description" content="{description}">
<meta name="{CSRF_META_NAME}" content="{csrf}">
<meta name="htmx-config" content="{htmx}">
{opengraph}<link rel="icon" href="{CONTENT_PREFIX}/logo.svg" type="image/svg+xml">
<link rel="stylesheet" href="{CONTENT_PREFIX}/styles.css">
<script type="module" src="{BOOTSTRAP_PATH}"{nonce}></script>
</head>
<body hx-boost="true">
{fragment}
</body>
</html>
"#,
        lang = escape(&site.language),
        description = escape(description),
        csrf = escape(ctx.csrf_token.unwrap_or_default()),
        htmx = escape(&htmx),
        opengraph = opengraph(site, page),
        fragment = render_fragment(site, page),
    ))
}
