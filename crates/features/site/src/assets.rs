use rust_embed::RustEmbed;

/// One week, for scripts and stylesheets.
pub const CACHE_WEEK: &str = "public, max-age=604800";
/// One year, for fonts and images that are renamed when they change.
pub const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
/// One week for browsers, twelve hours for shared caches.
pub const CACHE_DEFAULT: &str = "public, max-age=604800, s-maxage=43200";

/// Static content served under `/content`.
#[derive(Debug, RustEmbed)]
#[folder = "../../../web/content/"]
pub struct Content;

/// `Cache-Control` value for a content path, chosen by extension.
pub fn cache_control_for(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("js" | "mjs" | "css") => CACHE_WEEK,
        Some("woff2" | "png" | "jpg" | "jpeg" | "webp" | "svg") => CACHE_IMMUTABLE,
        _ => CACHE_DEFAULT,
    }
}
