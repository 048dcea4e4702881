//! In-memory memo of resolved slide roots and extracted archives.
//!
//! Entries are never evicted for the life of the process. No disk I/O here.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use dashmap::DashMap;

/// Process-wide resolution memo, shared by reference (`Arc`).
#[derive(Debug, Default)]
pub struct ResolutionCache {
    /// slide id -> slide root
    resolved: DashMap<String, PathBuf>,
    /// archive path -> extraction dir
    extracted: DashMap<PathBuf, PathBuf>,
    /// Exploded root, registered once for teardown.
    exploded_root: OnceLock<PathBuf>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_resolved(&self, slide: &str) -> Option<PathBuf> {
        self.resolved.get(slide).map(|entry| entry.value().clone())
    }

    /// Store `root` unless a value is already present; returns the stored value.
    ///
    /// Concurrent first resolutions agree: the first writer wins.
    pub fn put_if_absent_resolved(&self, slide: &str, root: PathBuf) -> PathBuf {
        self.resolved
            .entry(slide.to_string())
            .or_insert(root)
            .value()
            .clone()
    }

    pub fn get_extracted(&self, archive: &Path) -> Option<PathBuf> {
        self.extracted.get(archive).map(|entry| entry.value().clone())
    }

    pub fn record_extracted(&self, archive: PathBuf, dir: PathBuf) {
        self.extracted.insert(archive, dir);
    }

    /// Register the exploded root on first call, running `on_first` exactly once.
    ///
    /// Later calls return the already registered path, whatever they pass.
    pub fn ensure_exploded_root_registered<F: FnOnce()>(&self, path: &Path, on_first: F) -> &Path {
        self.exploded_root.get_or_init(|| {
            on_first();
            path.to_path_buf()
        })
    }

    pub fn exploded_root(&self) -> Option<&Path> {
        self.exploded_root.get().map(PathBuf::as_path)
    }
}
