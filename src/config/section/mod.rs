//! Configuration section definitions.
//!
//! Each module corresponds to a section in `slides.toml`:
//!
//! | Module    | TOML Section  | Purpose                                |
//! |-----------|---------------|----------------------------------------|
//! | `serve`   | `[serve]`     | HTTP server (interface, port, mount)   |
//! | `slides`  | `[slides]`    | Slide directories and extraction area  |
//! | `webroot` | `[webroot]`   | Static asset root                      |

mod serve;
mod slides;
mod webroot;

pub use serve::ServeConfig;
pub use slides::SlidesConfig;
pub use webroot::WebrootConfig;
