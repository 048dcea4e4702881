//! Request routing independent of the HTTP transport.
//!
//! Handlers see a normalized [`RouteRequest`] and either produce a [`Reply`]
//! or pass the request on with [`Outcome::Next`]. A request no handler
//! answers gets 404.

use std::fmt;

use super::path::normalize_url;
use crate::utils::mime::types::PLAIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other,
}

impl Method {
    /// GET and HEAD are the only routed methods.
    pub fn is_read(self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }
}

impl From<&tiny_http::Method> for Method {
    fn from(method: &tiny_http::Method) -> Self {
        match method {
            tiny_http::Method::Get => Self::Get,
            tiny_http::Method::Head => Self::Head,
            _ => Self::Other,
        }
    }
}

/// Request as seen by handlers.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    /// Normalized path, see [`normalize_url`].
    pub path: String,
}

impl RouteRequest {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            path: normalize_url(url),
        }
    }

    #[cfg(test)]
    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }
}

/// A complete response, written to the connection by `response::send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            location: None,
            body,
        }
    }

    /// 302 Found.
    pub fn redirect(location: String) -> Self {
        Self {
            location: Some(location),
            ..Self::plain(302, "302 Found")
        }
    }

    pub fn bad_request() -> Self {
        Self::plain(400, "400 Bad Request")
    }

    pub fn not_found() -> Self {
        Self::plain(404, "404 Not Found")
    }

    pub fn server_error() -> Self {
        Self::plain(500, "500 Internal Server Error")
    }

    pub fn unavailable() -> Self {
        Self::plain(503, "503 Service Unavailable")
    }

    fn plain(status: u16, text: &str) -> Self {
        Self {
            status,
            content_type: PLAIN,
            location: None,
            body: text.as_bytes().to_vec(),
        }
    }
}

pub enum Outcome {
    Reply(Reply),
    /// Not handled here; try the next handler.
    Next,
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Self::Reply(reply)
    }
}

pub trait Handler: Send + Sync {
    fn handle(&self, request: &RouteRequest) -> Outcome;
}

/// Ordered handler chain.
#[derive(Default)]
pub struct Router {
    handlers: Vec<Box<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn dispatch(&self, request: &RouteRequest) -> Reply {
        self.handlers
            .iter()
            .find_map(|handler| match handler.handle(request) {
                Outcome::Reply(reply) => Some(reply),
                Outcome::Next => None,
            })
            .unwrap_or_else(Reply::not_found)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
