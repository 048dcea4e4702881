//! Turns a resolved slide root plus a residual path into response content.
//!
//! - `""` or `slide.tmpl`: the rendered slide page
//! - anything else: the raw file under the slide root

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::error::SlideError;
use super::meta::{default_meta, load_meta};
use crate::embed::serve::{SLIDE_HTML, SLIDE_HTML_NAME};
use crate::render::{TemplateEngine, TemplateSource};
use crate::utils::mime;

/// Per-slide page template, relative to the slide root.
pub const SLIDE_TEMPLATE: &str = "slide.tmpl";

/// Response payload for one slide request.
#[derive(Debug)]
pub struct Content {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub struct ContentResponder {
    defaults: Map<String, Value>,
    engine: Arc<dyn TemplateEngine>,
}

impl ContentResponder {
    /// `web_root_path` is exposed to templates as `webRootPath`.
    pub fn new(web_root_path: &str, engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            defaults: default_meta(web_root_path),
            engine,
        }
    }

    /// Content for `residual` under `root`; `Ok(None)` when no such file exists.
    pub fn respond(&self, root: &Path, residual: &str) -> Result<Option<Content>, SlideError> {
        if residual.is_empty() || residual == SLIDE_TEMPLATE {
            return self.page(root).map(Some);
        }
        self.asset(root, residual)
    }

    fn page(&self, root: &Path) -> Result<Content, SlideError> {
        let meta = load_meta(root, &self.defaults)?;

        let custom = root.join(SLIDE_TEMPLATE);
        let source = if custom.is_file() {
            TemplateSource::File(custom)
        } else {
            TemplateSource::BuiltIn {
                name: SLIDE_HTML_NAME,
                content: SLIDE_HTML,
            }
        };

        let body = self.engine.render(&meta, &source)?;
        Ok(Content {
            content_type: mime::types::HTML,
            body,
        })
    }

    fn asset(&self, root: &Path, residual: &str) -> Result<Option<Content>, SlideError> {
        let Some(path) = resolve_asset(root, residual) else {
            return Ok(None);
        };
        let body = fs::read(&path).map_err(|source| SlideError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(Content {
            content_type: mime::from_path(&path),
            body,
        }))
    }
}

/// Resolve `residual` to a regular file inside `root`.
///
/// Symlinks are followed, but the target must still lie within `root`.
fn resolve_asset(root: &Path, residual: &str) -> Option<PathBuf> {
    let local = root.join(residual);
    let canonical = local.canonicalize().ok()?;
    let root = root.canonicalize().ok()?;

    (canonical.starts_with(&root) && canonical.is_file()).then_some(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlaceholderEngine;
    use crate::slide::meta::SLIDE_META;
    use crate::slide::test_utils::write_slide_dir;
    use tempfile::TempDir;

    fn responder() -> ContentResponder {
        ContentResponder::new("", Arc::new(PlaceholderEngine))
    }

    fn page_text(content: Content) -> String {
        String::from_utf8(content.body).unwrap()
    }

    #[test]
    fn test_builtin_page_uses_defaults() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(temp.path(), &[("slide.md", "# Hi")]);

        let content = responder().respond(temp.path(), "").unwrap().unwrap();
        assert_eq!(content.content_type, "text/html; charset=utf-8");

        let html = page_text(content);
        assert!(html.contains("<title>Slides</title>"));
        assert!(html.contains("/reveal.js/dist/theme/moon.css"));
        assert!(html.contains("controlsLayout: 'bottom-right'"));
    }

    #[test]
    fn test_page_merges_slide_json() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(
            temp.path(),
            &[(SLIDE_META, r#"{"title":"Demo","reveal":{"theme":"black"}}"#)],
        );

        let html = page_text(responder().respond(temp.path(), "").unwrap().unwrap());
        assert!(html.contains("<title>Demo</title>"));
        assert!(html.contains("theme/black.css"));
        assert!(html.contains("controls: true"));
    }

    #[test]
    fn test_custom_template_wins() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(
            temp.path(),
            &[(SLIDE_TEMPLATE, "<p>${title} on ${reveal.theme}</p>")],
        );

        for residual in ["", SLIDE_TEMPLATE] {
            let html = page_text(responder().respond(temp.path(), residual).unwrap().unwrap());
            assert_eq!(html, "<p>Slides on moon</p>");
        }
    }

    #[test]
    fn test_web_root_path_exposed() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(temp.path(), &[(SLIDE_TEMPLATE, "${webRootPath}/x.css")]);

        let responder = ContentResponder::new("/static", Arc::new(PlaceholderEngine));
        let html = page_text(responder.respond(temp.path(), "").unwrap().unwrap());
        assert_eq!(html, "/static/x.css");
    }

    #[test]
    fn test_asset_bytes_and_type() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(
            temp.path(),
            &[("index.html", "<p>raw ${title}</p>"), ("css/a.css", "p{}")],
        );

        let content = responder().respond(temp.path(), "index.html").unwrap().unwrap();
        assert_eq!(content.content_type, "text/html; charset=utf-8");
        assert_eq!(content.body, b"<p>raw ${title}</p>");

        let content = responder().respond(temp.path(), "css/a.css").unwrap().unwrap();
        assert_eq!(content.content_type, "text/css; charset=utf-8");
    }

    #[test]
    fn test_missing_asset_is_none() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(temp.path(), &[("slide.md", "# Hi")]);

        assert!(responder().respond(temp.path(), "nope.png").unwrap().is_none());
        // Directories are not served as assets
        fs::create_dir_all(temp.path().join("img")).unwrap();
        assert!(responder().respond(temp.path(), "img").unwrap().is_none());
    }

    #[test]
    fn test_asset_cannot_escape_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("deck");
        write_slide_dir(&root, &[("slide.md", "# Hi")]);
        fs::write(temp.path().join("secret.txt"), "secret").unwrap();

        assert!(responder().respond(&root, "../secret.txt").unwrap().is_none());
    }

    #[test]
    fn test_broken_metadata_is_error() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(temp.path(), &[(SLIDE_META, "{oops")]);

        let err = responder().respond(temp.path(), "").unwrap_err();
        assert!(matches!(err, SlideError::Metadata { .. }));
    }

    #[test]
    fn test_template_missing_value_is_error() {
        let temp = TempDir::new().unwrap();
        write_slide_dir(temp.path(), &[(SLIDE_TEMPLATE, "${author}")]);

        let err = responder().respond(temp.path(), "").unwrap_err();
        assert!(matches!(err, SlideError::Render(_)));
    }
}
