//! Zip extraction with path-traversal ("zip-slip") protection.
//!
//! Every entry is mapped to `target/<entry name>` and checked to stay inside
//! `target` before anything is written for it. An escaping entry aborts the
//! whole extraction.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use zip::result::ZipError;

use crate::utils::path::clean;

/// Copy buffer size for entry streams.
const COPY_BUF_SIZE: usize = 8 * 1024;

/// Extraction failure.
///
/// Cloneable so one result can be broadcast to every caller waiting on the
/// same archive.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("cannot read archive `{}`", archive.display())]
    ArchiveRead {
        archive: PathBuf,
        #[source]
        source: Arc<ZipError>,
    },

    #[error("archive entry `{entry}` escapes `{}`", target.display())]
    PathTraversal { entry: String, target: PathBuf },

    #[error("failed to write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("extraction of `{}` aborted", archive.display())]
    Aborted { archive: PathBuf },
}

impl ExtractError {
    fn read(archive: &Path, source: impl Into<ZipError>) -> Self {
        Self::ArchiveRead {
            archive: archive.to_path_buf(),
            source: Arc::new(source.into()),
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    fn traversal(entry: &str, target: &Path) -> Self {
        Self::PathTraversal {
            entry: entry.to_string(),
            target: target.to_path_buf(),
        }
    }
}

/// Extract every entry of `archive` into `target`.
///
/// Creates `target` (and parents) if missing. With `overwrite == false`,
/// entries whose destination already exists are skipped.
///
/// Blocking: run it on a worker thread, never on a request thread.
pub fn extract_archive(
    archive: &Path,
    target: &Path,
    overwrite: bool,
) -> Result<PathBuf, ExtractError> {
    fs::create_dir_all(target).map_err(|e| ExtractError::io(target, e))?;
    let target_canonical = target
        .canonicalize()
        .map_err(|e| ExtractError::io(target, e))?;

    let file = File::open(archive).map_err(|e| ExtractError::read(archive, e))?;
    let mut zip =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractError::read(archive, e))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| ExtractError::read(archive, e))?;
        let name = entry.name().to_string();
        let dest = entry_destination(target, &name)?;

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| ExtractError::io(&dest, e))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
            // A symlinked directory left in `target` must not redirect the write
            let parent_canonical = parent
                .canonicalize()
                .map_err(|e| ExtractError::io(parent, e))?;
            if !parent_canonical.starts_with(&target_canonical) {
                return Err(ExtractError::traversal(&name, target));
            }
        }

        if !overwrite && dest.exists() {
            continue;
        }

        write_entry(&mut entry, &dest, archive)?;
    }

    Ok(target.to_path_buf())
}

/// Map an entry name to its destination, rejecting names that leave `target`.
fn entry_destination(target: &Path, name: &str) -> Result<PathBuf, ExtractError> {
    if name.contains('\0') {
        return Err(ExtractError::traversal(name, target));
    }

    let relative = Path::new(name);
    let rooted = relative
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)));
    if rooted {
        return Err(ExtractError::traversal(name, target));
    }

    let base = clean(target);
    let dest = clean(&target.join(relative));
    if !dest.starts_with(&base) {
        return Err(ExtractError::traversal(name, target));
    }
    Ok(dest)
}

/// Write one entry; a partially written file is removed on failure.
fn write_entry<R: Read>(entry: &mut R, dest: &Path, archive: &Path) -> Result<(), ExtractError> {
    let mut out = File::create(dest).map_err(|e| ExtractError::io(dest, e))?;
    let result = copy_entry(entry, &mut out, dest, archive);
    if result.is_err() {
        drop(out);
        let _ = fs::remove_file(dest);
    }
    result
}

/// Copy the entry stream, telling archive read errors apart from write errors.
fn copy_entry<R: Read>(
    entry: &mut R,
    out: &mut File,
    dest: &Path,
    archive: &Path,
) -> Result<(), ExtractError> {
    let mut buf = [0u8; COPY_BUF_SIZE];
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractError::read(archive, e)),
        };
        out.write_all(&buf[..n])
            .map_err(|e| ExtractError::io(dest, e))?;
    }
    out.flush().map_err(|e| ExtractError::io(dest, e))
}
