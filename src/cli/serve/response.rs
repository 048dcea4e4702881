//! Writing replies to tiny_http connections.

use std::io::{self, ErrorKind};

use anyhow::{Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::route::Reply;
use crate::log;

/// Send `reply` on `request`. HEAD requests get headers only.
///
/// A client that went away mid-response is logged, not treated as an error.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut headers = vec![make_header("Content-Type", reply.content_type)?];
    if let Some(location) = &reply.location {
        headers.push(make_header("Location", location)?);
    }

    let result = if is_head_request(&request) {
        let mut response = Response::empty(StatusCode(reply.status));
        for header in headers {
            response.add_header(header);
        }
        request.respond(response)
    } else {
        let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
        for header in headers {
            response.add_header(header);
        }
        request.respond(response)
    };

    finish(result)
}

fn finish(result: io::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if is_closed(&e) => {
            log!("warning"; "response has been closed: {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn is_closed(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof
    )
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header `{}: {}`", key, value))
}
