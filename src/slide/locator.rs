//! Slide lookup: cache, then directory, then zip archive.

use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cache::ResolutionCache;
use super::error::SlideError;
use super::scheduler::ExtractScheduler;
use crate::config::SlidesConfig;
use crate::{debug, log};

/// Maps a slide id to the directory its content is served from.
pub struct SlideLocator {
    root_dir: PathBuf,
    zip_root_dir: PathBuf,
    exploded_dir: PathBuf,
    cache: Arc<ResolutionCache>,
    scheduler: Arc<ExtractScheduler>,
}

impl SlideLocator {
    pub fn new(
        config: &SlidesConfig,
        cache: Arc<ResolutionCache>,
        scheduler: Arc<ExtractScheduler>,
    ) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            zip_root_dir: config.zip_root_dir.clone(),
            exploded_dir: config.exploded_dir.clone(),
            cache,
            scheduler,
        }
    }

    /// Resolve `slide` to its content root.
    ///
    /// `Ok(None)` means no such slide: nothing is cached or extracted then.
    /// Once resolved, a slide keeps its root for the life of the process,
    /// even if its directory or archive disappears later.
    pub fn resolve(&self, slide: &str) -> Result<Option<PathBuf>, SlideError> {
        if let Some(root) = self.cache.get_resolved(slide) {
            return Ok(Some(root));
        }

        let Some(root) = self.locate(slide)? else {
            debug!("slides"; "no slide `{}`", slide);
            return Ok(None);
        };

        let root = self.cache.put_if_absent_resolved(slide, root);
        debug!("slides"; "resolved `{}` -> {}", slide, root.display());
        Ok(Some(root))
    }

    fn locate(&self, slide: &str) -> Result<Option<PathBuf>, SlideError> {
        let dir = self.root_dir.join(slide);
        if probe(&dir, Metadata::is_dir)? {
            return Ok(Some(dir));
        }

        let archive = self.zip_root_dir.join(format!("{slide}.zip"));
        if !probe(&archive, Metadata::is_file)? {
            return Ok(None);
        }

        if let Some(dir) = self.cache.get_extracted(&archive) {
            return Ok(Some(dir));
        }

        let exploded = self
            .cache
            .ensure_exploded_root_registered(&self.exploded_dir, || {
                log!("extract"; "extracting archives under {}", self.exploded_dir.display());
            });
        let dir = self.scheduler.extract(&archive, &exploded.join(slide))?;
        Ok(Some(dir))
    }
}

/// Check `path` with `check`; absence is `false`, any other failure an error.
fn probe(path: &Path, check: fn(&Metadata) -> bool) -> Result<bool, SlideError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(check(&meta)),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(false),
        Err(source) => Err(SlideError::Resolution {
            path: path.to_path_buf(),
            source,
        }),
    }
}
