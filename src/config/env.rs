//! Environment overrides for configuration keys.
//!
//! Every recognized dotted key maps to an environment variable by
//! upper-casing it and replacing `.` with `_`:
//!
//! ```text
//! slides.root.dir   → SLIDES_ROOT_DIR
//! webroot.path      → WEBROOT_PATH
//! http.server.port  → HTTP_SERVER_PORT
//! ```
//!
//! An override outranks the value from `slides.toml`.

use super::{ConfigError, SiteConfig};
use std::str::FromStr;

/// Environment variable name for a dotted config key.
pub fn env_key(key: &str) -> String {
    key.to_ascii_uppercase().replace('.', "_")
}

/// Lookup backed by the process environment.
pub fn from_env(key: &str) -> Option<String> {
    std::env::var(env_key(key)).ok()
}

impl SiteConfig {
    /// Apply overrides supplied by `lookup` (keyed by dotted config key).
    pub(super) fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("slides.path") {
            self.slides.path = v;
        }
        if let Some(v) = lookup("slides.root.dir") {
            self.slides.root_dir = v.into();
        }
        if let Some(v) = lookup("slides.zip.root.dir") {
            self.slides.zip_root_dir = v.into();
        }
        if let Some(v) = lookup("exploded.dir") {
            self.slides.exploded_dir = v.into();
        }
        if let Some(v) = lookup("slides.extract.workers") {
            self.slides.extract_workers = parse("slides.extract.workers", v)?;
        }
        if let Some(v) = lookup("webroot") {
            self.webroot.dir = v.into();
        }
        if let Some(v) = lookup("webroot.path") {
            self.webroot.path = v;
        }
        if let Some(v) = lookup("webroot.listing") {
            self.webroot.listing = parse("webroot.listing", v)?;
        }
        if let Some(v) = lookup("http.server.host") {
            self.serve.interface = parse("http.server.host", v)?;
        }
        if let Some(v) = lookup("http.server.port") {
            self.serve.port = parse("http.server.port", v)?;
        }
        if let Some(v) = lookup("serve.mount") {
            self.serve.mount = v;
        }
        if let Some(v) = lookup("serve.threads") {
            self.serve.threads = parse("serve.threads", v)?;
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Override {
        key,
        var: env_key(key),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("slides.root.dir"), "SLIDES_ROOT_DIR");
        assert_eq!(env_key("webroot"), "WEBROOT");
        assert_eq!(env_key("exploded.dir"), "EXPLODED_DIR");
    }

    #[test]
    fn test_override_outranks_file() {
        let mut config = test_parse_config("[slides]\nroot_dir = \"from-file\"\npath = \"/file\"");
        config
            .apply_overrides(lookup(&[("slides.root.dir", "from-env")]))
            .unwrap();

        assert_eq!(config.slides.root_dir, PathBuf::from("from-env"));
        // not overridden: file value stays
        assert_eq!(config.slides.path, "/file");
    }

    #[test]
    fn test_override_typed_values() {
        let mut config = test_parse_config("");
        config
            .apply_overrides(lookup(&[
                ("http.server.host", "0.0.0.0"),
                ("http.server.port", "9000"),
                ("webroot.listing", "false"),
                ("slides.extract.workers", "3"),
            ]))
            .unwrap();

        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.serve.port, 9000);
        assert!(!config.webroot.listing);
        assert_eq!(config.slides.extract_workers, 3);
    }

    #[test]
    fn test_override_invalid_value() {
        let mut config = test_parse_config("");
        let err = config
            .apply_overrides(lookup(&[("http.server.port", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Override { key: "http.server.port", .. }));
    }
}
