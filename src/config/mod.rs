//! Server configuration management for `slides.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── serve      # [serve]
//! │   ├── slides     # [slides]
//! │   └── webroot    # [webroot]
//! ├── env.rs         # Environment overrides
//! ├── error.rs       # ConfigError
//! ├── util.rs        # Config file lookup, path resolution
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Precedence
//!
//! Built-in defaults < `slides.toml` < environment variables < CLI flags.

mod env;
mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{ServeConfig, SlidesConfig, WebrootConfig};

use crate::utils::path::clean;
use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::{find_config_file, resolve_dir};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "slides.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing slides.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Base directory relative paths resolve against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Slide lookup and extraction settings
    #[serde(default)]
    pub slides: SlidesConfig,

    /// Static web root settings
    #[serde(default)]
    pub webroot: WebrootConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments and the process environment.
    ///
    /// Without `--config`, searches upward from cwd for `slides.toml`; a
    /// missing default file means "all defaults".
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match &cli.config {
            Some(path) => {
                let path = if path.is_absolute() { path.clone() } else { cwd.join(path) };
                if !path.exists() {
                    return Err(ConfigError::NotFound(path).into());
                }
                (Self::from_path(&path)?, path)
            }
            None => match find_config_file(Path::new(DEFAULT_CONFIG_FILE)) {
                Some(path) => (Self::from_path(&path)?, path),
                None => (Self::default(), cwd.join(DEFAULT_CONFIG_FILE)),
            },
        };

        let root = config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);

        config.config_path = config_path;
        config.apply_overrides(env::from_env)?;
        config.apply_cli(cli);
        config.finalize(&root);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI flags, which outrank both file and environment.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.serve.interface, cli.interface.as_ref());
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every directory against the config file's directory.
    fn finalize(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.set_root(&root);

        self.slides.root_dir = resolve_dir(&self.slides.root_dir, &root);
        self.slides.zip_root_dir = resolve_dir(&self.slides.zip_root_dir, &root);
        self.slides.exploded_dir = resolve_dir(&self.slides.exploded_dir, &root);
        self.webroot.dir = resolve_dir(&self.webroot.dir, &root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slides.url_path() == "/" {
            // The slide routes would shadow the whole web root
            return Err(ConfigError::Validation("slides.path must not be empty or `/`".into()));
        }
        if self.serve.threads == 0 {
            return Err(ConfigError::Validation("serve.threads must be at least 1".into()));
        }
        if self.slides.extract_workers == 0 {
            return Err(ConfigError::Validation(
                "slides.extract_workers must be at least 1".into(),
            ));
        }
        // Teardown removes the exploded dir recursively
        let exploded = clean(&self.slides.exploded_dir);
        if exploded.as_os_str().is_empty() || clean(self.get_root()).starts_with(&exploded) {
            return Err(ConfigError::Validation(format!(
                "slides.exploded_dir `{}` must not contain the site root",
                exploded.display()
            )));
        }
        for (key, dir) in [
            ("slides.root_dir", &self.slides.root_dir),
            ("slides.zip_root_dir", &self.slides.zip_root_dir),
            ("webroot.dir", &self.webroot.dir),
        ] {
            let dir = clean(dir);
            if exploded.starts_with(&dir) || dir.starts_with(&exploded) {
                return Err(ConfigError::Validation(format!(
                    "slides.exploded_dir `{}` overlaps {key} `{}`",
                    exploded.display(),
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
