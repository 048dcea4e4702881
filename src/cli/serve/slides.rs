//! Slide routes: `<mount><slides.path>/<slide>/<residual>`.

use super::path::encode_segment;
use super::route::{Handler, Outcome, Reply, RouteRequest};
use crate::slide::{ContentResponder, SlideError, SlideLocator};
use crate::{debug, log};

/// Slide part of a request path, relative to the slides prefix.
#[derive(Debug, PartialEq, Eq)]
enum SlideRoute<'a> {
    /// No usable slide id.
    Invalid,
    /// `<prefix><slide>` without trailing slash.
    MissingSlash(&'a str),
    Slide { slide: &'a str, residual: &'a str },
}

impl<'a> SlideRoute<'a> {
    /// `None` when `path` is not under `prefix` (which ends with `/`).
    fn parse(path: &'a str, prefix: &str) -> Option<Self> {
        let rest = path.strip_prefix(prefix)?;
        if rest.contains('\0') {
            return Some(Self::Invalid);
        }
        Some(match rest.split_once('/') {
            _ if rest.is_empty() => Self::Invalid,
            None => Self::MissingSlash(rest),
            Some(("", _)) => Self::Invalid,
            Some((slide, residual)) => Self::Slide { slide, residual },
        })
    }
}

pub struct SlideHandler {
    /// Mount prefix plus slides path, with trailing slash (`/talks/slides/`).
    prefix: String,
    locator: SlideLocator,
    responder: ContentResponder,
}

impl SlideHandler {
    pub fn new(prefix: String, locator: SlideLocator, responder: ContentResponder) -> Self {
        Self {
            prefix,
            locator,
            responder,
        }
    }

    fn serve(&self, slide: &str, residual: &str) -> Outcome {
        let root = match self.locator.resolve(slide) {
            Ok(Some(root)) => root,
            Ok(None) => return Outcome::Next,
            Err(e) => return server_error(slide, e),
        };

        match self.responder.respond(&root, residual) {
            Ok(Some(content)) => {
                debug!("slides"; "{} /{} ({} bytes)", slide, residual, content.body.len());
                Reply::ok(content.content_type, content.body).into()
            }
            Ok(None) => Reply::not_found().into(),
            Err(e) => server_error(slide, e),
        }
    }
}

impl Handler for SlideHandler {
    fn handle(&self, request: &RouteRequest) -> Outcome {
        if !request.method.is_read() {
            return Outcome::Next;
        }
        let Some(route) = SlideRoute::parse(&request.path, &self.prefix) else {
            return Outcome::Next;
        };

        match route {
            SlideRoute::Invalid => Reply::bad_request().into(),
            SlideRoute::MissingSlash(slide) => {
                Reply::redirect(format!("{}{}/", self.prefix, encode_segment(slide))).into()
            }
            SlideRoute::Slide { slide, residual } => self.serve(slide, residual),
        }
    }
}

fn server_error(slide: &str, error: SlideError) -> Outcome {
    log!("error"; "slide `{}`: {:#}", slide, anyhow::Error::from(error));
    Reply::server_error().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slide_route() {
        let prefix = "/slides/";
        assert_eq!(SlideRoute::parse("/other/x", prefix), None);
        assert_eq!(SlideRoute::parse("/slides", prefix), None);
        assert_eq!(SlideRoute::parse("/slides/", prefix), Some(SlideRoute::Invalid));
        assert_eq!(
            SlideRoute::parse("/slides/intro", prefix),
            Some(SlideRoute::MissingSlash("intro"))
        );
        assert_eq!(
            SlideRoute::parse("/slides/intro/", prefix),
            Some(SlideRoute::Slide { slide: "intro", residual: "" })
        );
        assert_eq!(
            SlideRoute::parse("/slides/intro/css/a.css", prefix),
            Some(SlideRoute::Slide { slide: "intro", residual: "css/a.css" })
        );
        assert_eq!(SlideRoute::parse("/slides/a\0b/", prefix), Some(SlideRoute::Invalid));
    }
}
