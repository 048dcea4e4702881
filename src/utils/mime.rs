//! Content types for slide assets and web root files.
//!
//! Textual types carry an explicit `charset=utf-8` so decks render
//! correctly regardless of the browser's default encoding.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const MARKDOWN: &str = "text/markdown; charset=utf-8";
    pub const CSV: &str = "text/csv; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const PDF: &str = "application/pdf";
    pub const WASM: &str = "application/wasm";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extension (lowercase) to content type.
const TABLE: &[(&str, &str)] = &[
    // reveal.js and its plugins
    ("html", types::HTML),
    ("htm", types::HTML),
    ("css", types::CSS),
    ("js", types::JAVASCRIPT),
    ("mjs", types::JAVASCRIPT),
    ("map", types::JSON),
    ("json", types::JSON),
    ("md", types::MARKDOWN),
    ("markdown", types::MARKDOWN),
    ("txt", types::PLAIN),
    ("csv", types::CSV),
    ("xml", types::XML),
    // Slide media
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("ico", "image/x-icon"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
    // Theme fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    // Handouts and embedded demos
    ("pdf", types::PDF),
    ("wasm", types::WASM),
];

/// Content type for `path`, by extension, ignoring case.
pub fn from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            TABLE
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(types::OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("dist/reveal.css")), types::CSS);
        assert_eq!(from_path(Path::new("plugin/notes.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("slide.md")), types::MARKDOWN);
        assert_eq!(from_path(Path::new("img/chart.svg")), "image/svg+xml");
        assert_eq!(from_path(Path::new("fonts/source.woff2")), "font/woff2");
        assert_eq!(from_path(Path::new("unknown.xyz")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("no_extension")), types::OCTET_STREAM);
    }

    #[test]
    fn test_extension_case_ignored() {
        assert_eq!(from_path(Path::new("INDEX.HTML")), types::HTML);
        assert_eq!(from_path(Path::new("Photo.JPG")), "image/jpeg");
    }

    #[test]
    fn test_text_types_carry_charset() {
        for name in ["a.html", "a.css", "a.js", "a.md", "a.txt", "a.csv"] {
            let mime = from_path(Path::new(name));
            assert!(mime.starts_with("text/"), "{name}");
            assert!(mime.ends_with("; charset=utf-8"), "{name}: {mime}");
        }
    }
}
