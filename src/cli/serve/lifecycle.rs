//! Server binding and teardown registration.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use tiny_http::Server;

use crate::core::Lifecycle;
use crate::log;
use crate::slide::{ExtractScheduler, ResolutionCache, remove_exploded_root};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map_or_else(|| "unknown error".to_string(), |e| e.to_string())
    ))
}

/// Stop extraction workers, then delete the exploded root, at teardown.
///
/// Workers go first so nothing writes into the directory being removed.
pub fn register_teardown(
    lifecycle: &Lifecycle,
    cache: &Arc<ResolutionCache>,
    scheduler: &Arc<ExtractScheduler>,
) {
    let scheduler = Arc::clone(scheduler);
    lifecycle.on_teardown("extract workers", move || scheduler.shutdown());

    let cache = Arc::clone(cache);
    lifecycle.on_teardown("exploded dir", move || remove_exploded_root(&cache));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlidesConfig;
    use crate::slide::SlideLocator;
    use crate::slide::test_utils::write_zip;
    use tempfile::TempDir;

    #[test]
    fn test_bind_retries_next_port() {
        let localhost: IpAddr = "127.0.0.1".parse().unwrap();
        // Port 0 lets the OS pick a free port
        let (first, _) = bind_with_retry(localhost, 0).unwrap();
        let taken = first.server_addr().to_ip().unwrap().port();

        let (_second, addr) = bind_with_retry(localhost, taken).unwrap();
        assert_ne!(addr.port(), taken);
    }

    #[test]
    fn test_teardown_removes_exploded_root() {
        let temp = TempDir::new().unwrap();
        let config = SlidesConfig {
            root_dir: temp.path().join("slides"),
            zip_root_dir: temp.path().join("slides_zip"),
            exploded_dir: temp.path().join("exploded"),
            ..SlidesConfig::default()
        };
        write_zip(
            &config.zip_root_dir.join("demo.zip"),
            &[("index.html", b"<p>demo</p>".as_slice())],
        );

        let cache = Arc::new(ResolutionCache::new());
        let scheduler = Arc::new(ExtractScheduler::start(Arc::clone(&cache), 1).unwrap());
        let lifecycle = Lifecycle::new();
        register_teardown(&lifecycle, &cache, &scheduler);

        let locator = SlideLocator::new(&config, Arc::clone(&cache), Arc::clone(&scheduler));
        locator.resolve("demo").unwrap().unwrap();
        assert!(config.exploded_dir.join("demo/index.html").is_file());

        lifecycle.teardown();
        assert!(!config.exploded_dir.exists());
    }
}
