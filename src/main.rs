//! Slideshow - serve reveal.js slide decks from directories or zip archives.

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod render;
mod slide;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use crate::cli::Cli;
use crate::config::SiteConfig;
use crate::core::Lifecycle;

fn main() -> Result<()> {
    let lifecycle = Arc::new(Lifecycle::new());
    // Setup Ctrl+C handling before any blocking operations
    lifecycle.setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;
    debug!("serve"; "config: {} (root {})", config.config_path.display(), config.get_root().display());

    let result = serve(&config, &lifecycle);
    lifecycle.teardown();
    result
}

/// Install routes, bind, and block in the request loop.
fn serve(config: &SiteConfig, lifecycle: &Arc<Lifecycle>) -> Result<()> {
    let router = cli::serve::install(config, lifecycle)?;
    let server = cli::serve::bind_server(config, lifecycle)?;
    server.run(router, config, lifecycle)
}
