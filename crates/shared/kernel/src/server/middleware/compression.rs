use axum::body::HttpBody;
use axum::http::{Response, header};
use tower_http::CompressionLevel;
use tower_http::compression::predicate::{And, Predicate, SizeAbove};
use tower_http::compression::CompressionLayer;

/// Content types worth compressing; everything else (images, archives) is already dense.
pub const COMPRESSIBLE_TYPES: &[&str] =
    &["text/html", "text/css", "text/javascript", "font/woff2", "image/svg+xml"];

/// Responses smaller than this are not worth the framing overhead.
const MIN_COMPRESS_SIZE: u16 = 256;

/// Compresses only [`COMPRESSIBLE_TYPES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressibleContent;

impl Predicate for CompressibleContent {
    fn should_compress<B>(&self, response: &Response<B>) -> bool
    where
        B: HttpBody,
    {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim())
            .is_some_and(|mime| COMPRESSIBLE_TYPES.iter().any(|t| t.eq_ignore_ascii_case(mime)))
    }
}

/// gzip/brotli compression at the configured quality.
pub fn compression_layer(level: i32) -> CompressionLayer<And<CompressibleContent, SizeAbove>> {
    CompressionLayer::new()
        .quality(CompressionLevel::Precise(level))
        .compress_when(CompressibleContent.and(SizeAbove::new(MIN_COMPRESS_SIZE)))
}
