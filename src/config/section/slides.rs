//! `[slides]` section configuration.
//!
//! Where slide decks live and where archived decks get extracted.
//!
//! # Example
//!
//! ```toml
//! [slides]
//! path = "/slides"                 # URL prefix of the slide routes
//! root_dir = "slides"              # <root_dir>/<slide>/ directories
//! zip_root_dir = "slides_zip"      # <zip_root_dir>/<slide>.zip archives
//! exploded_dir = "/tmp/exploded"   # Extraction area (default: fresh temp path)
//! extract_workers = 2              # Extraction worker threads
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Slide lookup and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidesConfig {
    /// URL prefix of the slide routes (`slides.path`).
    pub path: String,

    /// Directory holding one sub-directory per slide (`slides.root.dir`).
    pub root_dir: PathBuf,

    /// Directory holding one `<slide>.zip` per archived slide (`slides.zip.root.dir`).
    pub zip_root_dir: PathBuf,

    /// Temporary area archives are extracted under (`exploded.dir`).
    /// Removed recursively at shutdown.
    pub exploded_dir: PathBuf,

    /// Size of the extraction worker pool.
    pub extract_workers: usize,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            path: "/slides".into(),
            root_dir: PathBuf::from("slides"),
            zip_root_dir: PathBuf::from("slides_zip"),
            exploded_dir: unique_exploded_dir(),
            extract_workers: 2,
        }
    }
}

impl SlidesConfig {
    /// URL prefix with leading and trailing slash (`/slides/`).
    pub fn url_path(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        }
    }
}

/// Fresh per-process path under the system temp directory.
///
/// Only the path is computed here; the directory is created on first extraction.
fn unique_exploded_dir() -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);

    std::env::temp_dir()
        .join("slides-exploded")
        .join(format!("{}-{nanos:x}-{seq}", std::process::id()))
}
