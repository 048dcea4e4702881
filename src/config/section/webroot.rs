//! `[webroot]` section configuration.
//!
//! Static assets (e.g. a bundled reveal.js) served independently of slides.
//!
//! # Example
//!
//! ```toml
//! [webroot]
//! dir = "webroot"      # Directory served as-is
//! path = "/"           # URL prefix it is served under
//! listing = true       # Render a listing for directories without index.html
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Static web-root settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebrootConfig {
    /// Directory served under `path` (`webroot`).
    pub dir: PathBuf,

    /// URL prefix of the web root (`webroot.path`).
    pub path: String,

    /// Whether directories without `index.html` get a listing.
    pub listing: bool,
}

impl Default for WebrootConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("webroot"),
            path: "/".into(),
            listing: true,
        }
    }
}

impl WebrootConfig {
    /// URL prefix with leading and trailing slash.
    pub fn url_path(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        }
    }

    /// URL prefix as exposed to templates: no trailing slash, `""` for the root.
    pub fn web_root_path(&self) -> String {
        self.url_path().trim_end_matches('/').to_string()
    }
}
