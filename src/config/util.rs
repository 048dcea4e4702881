//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/talks/slides/intro/  ← cwd
/// /home/user/talks/slides.toml    ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    // Walk up from cwd looking for config file
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Expand `~` and resolve a relative directory against `root`.
pub fn resolve_dir(path: &Path, root: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    let full_path = if path.is_relative() {
        root.join(&path)
    } else {
        path
    };
    crate::utils::path::normalize_path(&full_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dir_relative() {
        let resolved = resolve_dir(Path::new("slides"), Path::new("/srv/talks"));
        assert_eq!(resolved, PathBuf::from("/srv/talks/slides"));
    }

    #[test]
    fn test_resolve_dir_absolute() {
        let resolved = resolve_dir(Path::new("/data/decks"), Path::new("/srv/talks"));
        assert_eq!(resolved, PathBuf::from("/data/decks"));
    }

    #[test]
    fn test_resolve_dir_tilde() {
        let resolved = resolve_dir(Path::new("~/decks"), Path::new("/srv/talks"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("decks"));
    }
}
