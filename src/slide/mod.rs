//! Slide resolution, extraction and content.
//!
//! # Module Structure
//!
//! ```text
//! slide/
//! ├── cache.rs      # ResolutionCache (slide roots, extracted archives)
//! ├── extract.rs    # Zip extraction with path-traversal checks
//! ├── scheduler.rs  # Single-flight extraction worker pool
//! ├── locator.rs    # SlideLocator: cache → directory → archive
//! ├── meta.rs       # slide.json defaults and merging
//! ├── content.rs    # ContentResponder: page or raw asset
//! └── error.rs      # SlideError
//! ```

mod cache;
mod content;
mod error;
mod extract;
mod locator;
mod meta;
mod scheduler;

#[cfg(test)]
pub mod test_utils;

pub use cache::ResolutionCache;
pub use content::ContentResponder;
pub use error::SlideError;
pub use locator::SlideLocator;
pub use scheduler::ExtractScheduler;

use std::fs;

use crate::{debug, log};

/// Remove the exploded root if one was ever registered.
///
/// Runs at teardown, after extraction workers have stopped.
pub fn remove_exploded_root(cache: &ResolutionCache) {
    let Some(root) = cache.exploded_root() else {
        return;
    };
    if !root.exists() {
        return;
    }
    match fs::remove_dir_all(root) {
        Ok(()) => debug!("extract"; "removed {}", root.display()),
        Err(e) => log!("warning"; "failed to remove {}: {}", root.display(), e),
    }
}
