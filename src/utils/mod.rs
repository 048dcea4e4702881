//! Utility modules shared by the server and slide handling.

pub mod html;
pub mod mime;
pub mod path;
