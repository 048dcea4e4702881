//! Core types shared across the codebase.

mod state;

pub use state::Lifecycle;
