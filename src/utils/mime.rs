//! MIME type detection for inlined assets and proxied responses.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";

    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
}

/// Guess MIME type from file extension.
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        Some("txt") => types::PLAIN,

        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("avif") => types::AVIF,
        Some("ico") => types::ICO,
        Some("bmp") => types::BMP,

        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        Some("otf") => types::OTF,

        _ => types::OCTET_STREAM,
    }
}

/// Whether a `Content-Type` header value denotes an HTML document.
pub fn is_html(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("text/html"))
}
