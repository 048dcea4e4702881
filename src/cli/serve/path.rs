//! Request URL normalization and URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Bytes escaped when a path segment is put back into a URL.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Normalize a request URL into an absolute path.
///
/// Strips query and fragment, percent-decodes, collapses empty and `.`
/// segments and applies `..` (never above `/`). A trailing slash is kept.
///
/// ```text
/// /slides//demo/./a/../b.css?x=1  →  /slides/demo/b.css
/// /slides/demo/                   →  /slides/demo/
/// ```
pub fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(decoded.len() + 1);
    out.push('/');
    out.push_str(&segments.join("/"));
    if !segments.is_empty() && decoded.ends_with('/') {
        out.push('/');
    }
    out
}

/// Percent-encode one path segment for use in a URL or `Location` header.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Percent-encode every segment of a normalized path, keeping the slashes.
pub fn encode_path(path: &str) -> String {
    path.split('/').map(encode_segment).collect::<Vec<_>>().join("/")
}

/// What a URL points at under a served directory.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    /// Directory without `index.html`.
    Dir(PathBuf),
}

/// Resolve `relative` under `serve_root`, handling index.html for directories.
///
/// Canonicalizes to resolve symlinks and verifies the result stays under
/// `serve_root`.
pub fn resolve_path(relative: &str, serve_root: &Path) -> Option<Resolved> {
    let local = serve_root.join(relative.trim_start_matches('/'));
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(Resolved::File(canonical));
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(Resolved::File(index));
        }
        return Some(Resolved::Dir(canonical));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url(""), "/");
        assert_eq!(normalize_url("/slides/demo"), "/slides/demo");
        assert_eq!(normalize_url("/slides/demo/"), "/slides/demo/");
        assert_eq!(normalize_url("/slides//demo/./a/../b.css?x=1"), "/slides/demo/b.css");
        assert_eq!(normalize_url("/slides/demo/#top"), "/slides/demo/");
        assert_eq!(normalize_url("/../../etc/passwd"), "/etc/passwd");
    }

    #[test]
    fn test_normalize_url_decodes() {
        assert_eq!(normalize_url("/slides/my%20talk/"), "/slides/my talk/");
        assert_eq!(normalize_url("/slides/%2e%2e/secret"), "/secret");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("intro"), "intro");
        assert_eq!(encode_segment("my talk"), "my%20talk");
        assert_eq!(encode_segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(encode_segment("日本"), "%E6%97%A5%E6%9C%AC");
        assert_eq!(encode_path("/a b/c/"), "/a%20b/c/");
    }

    #[test]
    fn test_resolve_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        fs::write(temp.path().join("docs/index.html"), "<p>docs</p>").unwrap();
        fs::write(temp.path().join("a.css"), "p{}").unwrap();
        let root = temp.path().canonicalize().unwrap();

        assert_eq!(
            resolve_path("a.css", temp.path()),
            Some(Resolved::File(root.join("a.css")))
        );
        assert_eq!(
            resolve_path("/docs/", temp.path()),
            Some(Resolved::File(root.join("docs/index.html")))
        );
        assert_eq!(
            resolve_path("empty", temp.path()),
            Some(Resolved::Dir(root.join("empty")))
        );
        assert_eq!(resolve_path("missing", temp.path()), None);
    }

    #[test]
    fn test_resolve_path_rejects_escape() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("www");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp.path().join("secret.txt"), "secret").unwrap();

        assert_eq!(resolve_path("../secret.txt", &root), None);
    }
}
