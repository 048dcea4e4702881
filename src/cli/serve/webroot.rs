//! Static web root: reveal.js and other shared assets.

use std::fs;
use std::path::{Path, PathBuf};

use super::path::{Resolved, encode_path, encode_segment, resolve_path};
use super::route::{Handler, Outcome, Reply, RouteRequest};
use crate::embed::serve::{LISTING_HTML, ListingVars};
use crate::log;
use crate::utils::{html::escape, mime};

pub struct WebrootHandler {
    /// Mount prefix plus web-root path, with trailing slash.
    prefix: String,
    dir: PathBuf,
    listing: bool,
}

impl WebrootHandler {
    pub fn new(prefix: String, dir: PathBuf, listing: bool) -> Self {
        Self {
            prefix,
            dir,
            listing,
        }
    }

    fn respond_file(&self, path: &Path) -> Outcome {
        match fs::read(path) {
            Ok(body) => Reply::ok(mime::from_path(path), body).into(),
            Err(e) => {
                log!("error"; "failed to read {}: {}", path.display(), e);
                Reply::server_error().into()
            }
        }
    }

    fn respond_listing(&self, url_path: &str, dir: &Path) -> Outcome {
        let mut names: Vec<(String, bool)> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|entry| {
                    let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
                    (entry.file_name().to_string_lossy().into_owned(), is_dir)
                })
                .collect(),
            Err(e) => {
                log!("error"; "failed to list {}: {}", dir.display(), e);
                return Reply::server_error().into();
            }
        };
        names.sort();

        let mut entries = String::new();
        if url_path != self.prefix {
            entries.push_str("<li><a href=\"../\">../</a></li>\n");
        }
        for (name, is_dir) in names {
            let slash = if is_dir { "/" } else { "" };
            entries.push_str(&format!(
                "<li><a href=\"{}{slash}\">{}{slash}</a></li>\n",
                encode_segment(&name),
                escape(&name),
            ));
        }

        let title = escape(url_path);
        let body = LISTING_HTML.render(&ListingVars {
            title: &title,
            entries: &entries,
        });
        Reply::ok(mime::types::HTML, body.into_bytes()).into()
    }
}

impl Handler for WebrootHandler {
    fn handle(&self, request: &RouteRequest) -> Outcome {
        if !request.method.is_read() {
            return Outcome::Next;
        }
        // `/static` is the web root itself when the prefix is `/static/`
        let rest = match request.path.strip_prefix(&self.prefix) {
            Some(rest) => rest,
            None if request.path == self.prefix.trim_end_matches('/') => "",
            None => return Outcome::Next,
        };

        match resolve_path(rest, &self.dir) {
            Some(Resolved::File(path)) => self.respond_file(&path),
            Some(Resolved::Dir(_)) if !request.path.ends_with('/') => {
                Reply::redirect(format!("{}/", encode_path(&request.path))).into()
            }
            Some(Resolved::Dir(dir)) if self.listing => self.respond_listing(&request.path, &dir),
            _ => Outcome::Next,
        }
    }
}
