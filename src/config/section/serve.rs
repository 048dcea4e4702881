//! `[serve]` section configuration.
//!
//! Contains HTTP server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! mount = ""                  # Prefix every route is mounted under
//! threads = 4                 # Request worker threads
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Routing prefix the slide and web-root routes are mounted under.
    /// Redirects keep this prefix.
    pub mount: String,

    /// Number of threads handling requests concurrently.
    pub threads: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            mount: String::new(),
            threads: 4,
        }
    }
}

impl ServeConfig {
    /// Mount prefix without a trailing slash (`""` or `/talks`).
    pub fn mount_prefix(&self) -> String {
        let trimmed = self.mount.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
