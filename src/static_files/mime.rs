//! Extension → MIME type table.

use std::path::Path;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// MIME type for a logical (decompressed) asset path.
///
/// A trailing `.gz` left on the logical path (double-compressed naming such as
/// `bundle.js.gz.gz`) is stripped once more before the lookup.
#[must_use]
pub fn content_type(logical_path: &str) -> &'static str {
    let name = logical_path.strip_suffix(".gz").unwrap_or(logical_path);
    let ext = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "map" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "webmanifest" => "application/manifest+json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Whether the logical path names an HTML document (eligible for rendering).
#[must_use]
pub fn is_html(logical_path: &str) -> bool {
    matches!(
        Path::new(logical_path)
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("html" | "htm")
    )
}
