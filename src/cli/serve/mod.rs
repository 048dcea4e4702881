//! HTTP server: slide routes, static web root, graceful shutdown.
//!
//! ```text
//! request ──► Router ──► SlideHandler   (<mount><slides.path>/...)
//!                   └──► WebrootHandler (<mount><webroot.path>/...)
//!                   └──► 404
//! ```

mod lifecycle;
mod path;
mod response;
mod route;
mod slides;
mod webroot;


use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Request, Server};

use crate::config::SiteConfig;
use crate::core::Lifecycle;
use crate::render::PlaceholderEngine;
use crate::slide::{ContentResponder, ExtractScheduler, ResolutionCache, SlideLocator};
use crate::{debug, log};
use route::{Method, Reply, RouteRequest, Router};
use slides::SlideHandler;
use webroot::WebrootHandler;

/// Build the router and its shared state.
///
/// Registers teardown of the extraction workers and the exploded dir.
pub fn install(config: &SiteConfig, lifecycle: &Lifecycle) -> Result<Router> {
    let cache = Arc::new(ResolutionCache::new());
    let scheduler = Arc::new(ExtractScheduler::start(
        Arc::clone(&cache),
        config.slides.extract_workers,
    )?);
    Ok(install_with(config, lifecycle, cache, scheduler))
}

/// Build the router around an existing cache and extraction pool.
fn install_with(
    config: &SiteConfig,
    lifecycle: &Lifecycle,
    cache: Arc<ResolutionCache>,
    scheduler: Arc<ExtractScheduler>,
) -> Router {
    lifecycle::register_teardown(lifecycle, &cache, &scheduler);

    let mount = config.serve.mount_prefix();
    let locator = SlideLocator::new(&config.slides, cache, scheduler);
    let responder = ContentResponder::new(
        &format!("{mount}{}", config.webroot.web_root_path()),
        Arc::new(PlaceholderEngine),
    );

    Router::new()
        .route(SlideHandler::new(
            format!("{mount}{}", config.slides.url_path()),
            locator,
            responder,
        ))
        .route(WebrootHandler::new(
            format!("{mount}{}", config.webroot.url_path()),
            config.webroot.dir.clone(),
            config.webroot.listing,
        ))
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
}

/// Bind the HTTP server and register it for graceful shutdown.
pub fn bind_server(config: &SiteConfig, lifecycle: &Lifecycle) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle.register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    log!(
        "slides";
        "slides are served under http://{}{}{}",
        addr,
        config.serve.mount_prefix(),
        config.slides.url_path()
    );

    Ok(BoundServer { server })
}

impl BoundServer {
    /// Run the request loop until shutdown unblocks the server.
    pub fn run(self, router: Router, config: &SiteConfig, lifecycle: &Arc<Lifecycle>) -> Result<()> {
        // Slide resolution can block on extraction, so requests run on a pool
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.serve.threads)
            .thread_name(|i| format!("request-{i}"))
            .build()?;
        let router = Arc::new(router);

        for request in self.server.incoming_requests() {
            let router = Arc::clone(&router);
            let lifecycle = Arc::clone(lifecycle);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &router, &lifecycle) {
                    log!("serve"; "request error: {e:#}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, router: &Router, lifecycle: &Lifecycle) -> Result<()> {
    if lifecycle.is_shutdown() {
        return response::send(request, Reply::unavailable());
    }

    let route = RouteRequest::new(Method::from(request.method()), request.url());
    let reply = router.dispatch(&route);
    debug!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);

    response::send(request, reply)
}
