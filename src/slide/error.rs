//! Slide resolution and rendering errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::extract::ExtractError;
use crate::render::RenderError;

/// Failure while locating or serving a slide.
///
/// "Slide not found" is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum SlideError {
    /// A storage probe failed for a reason other than "does not exist".
    #[error("failed to probe `{}`", path.display())]
    Resolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("invalid slide metadata `{}`", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}
