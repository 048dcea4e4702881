//! Process lifecycle: shutdown signalling and teardown hooks.
//!
//! - `shutdown`: Ctrl+C received; requests get 503 from then on
//! - teardown hooks: run once, in registration order, after the request
//!   loop returns (stop extraction workers, remove the exploded dir)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tiny_http::Server;

use crate::{debug, log};

type Hook = Box<dyn FnOnce() + Send>;

/// Shared lifecycle state, passed around as `Arc<Lifecycle>`.
#[derive(Default)]
pub struct Lifecycle {
    shutdown: AtomicBool,
    server: OnceLock<Arc<Server>>,
    hooks: Mutex<Vec<(&'static str, Hook)>>,
    torn_down: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the Ctrl+C handler. Call once at program start.
    ///
    /// - Before `register_server()`: exit immediately, nothing to clean up yet
    /// - After `register_server()`: unblock the server so the request loop ends
    pub fn setup_shutdown_handler(self: &Arc<Self>) -> anyhow::Result<()> {
        let lifecycle = Arc::clone(self);
        ctrlc::set_handler(move || {
            if !lifecycle.request_shutdown() {
                std::process::exit(0);
            }
        })
        .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
    }

    /// Flag shutdown and unblock the server. Returns whether a server was registered.
    pub fn request_shutdown(&self) -> bool {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.server.get() {
            Some(server) => {
                log!("serve"; "shutting down...");
                server.unblock();
                true
            }
            None => false,
        }
    }

    /// Register the HTTP server for graceful shutdown.
    pub fn register_server(&self, server: Arc<Server>) {
        let _ = self.server.set(server);
    }

    /// Check if shutdown has been requested
    ///
    /// Relaxed: worst case a few more requests are served normally.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Add a hook to run at teardown.
    pub fn on_teardown(&self, name: &'static str, hook: impl FnOnce() + Send + 'static) {
        self.hooks.lock().push((name, Box::new(hook)));
    }

    /// Run teardown hooks in registration order. Later calls do nothing.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks = std::mem::take(&mut *self.hooks.lock());
        for (name, hook) in hooks {
            debug!("serve"; "teardown: {}", name);
            hook();
        }
    }
}
