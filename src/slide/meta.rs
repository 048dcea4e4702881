//! Slide metadata: built-in defaults merged with a slide's `slide.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value, json};

use super::error::SlideError;

/// Per-slide metadata file, relative to the slide root.
pub const SLIDE_META: &str = "slide.json";

/// Depth `slide.json` is merged into the defaults with.
///
/// Top-level keys and the keys of top-level objects (e.g. `reveal.theme`)
/// merge individually; anything deeper is replaced wholesale.
pub const MERGE_DEPTH: usize = 2;

/// Default metadata every slide starts from.
///
/// `web_root_path` is the URL prefix of the web root without trailing slash.
pub fn default_meta(web_root_path: &str) -> Map<String, Value> {
    let defaults = json!({
        "title": "Slides",
        "webRootPath": web_root_path,
        "reveal": {
            "theme": "moon",
            "controls": "true",
            "progress": "true",
            "history": "true",
            "center": "true",
            "hash": "true",
            "loop": "false",
            "layout": "bottom-right",
            "transition": "slide",
            "highlight": "monokai",
        },
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Merge `other` into `base`, recursing into objects while `depth > 1`.
///
/// At depth 1 values from `other` replace those in `base` key by key.
pub fn merge_in(base: &mut Map<String, Value>, other: Map<String, Value>, depth: usize) {
    if depth == 0 {
        return;
    }
    for (key, incoming) in other {
        match incoming {
            Value::Object(incoming) if depth > 1 => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    merge_in(existing, incoming, depth - 1);
                } else {
                    base.insert(key, Value::Object(incoming));
                }
            }
            incoming => {
                base.insert(key, incoming);
            }
        }
    }
}

/// Defaults merged with `<root>/slide.json`, if present.
///
/// A missing file is not an error; a malformed or non-object one is.
pub fn load_meta(root: &Path, defaults: &Map<String, Value>) -> Result<Value, SlideError> {
    let mut meta = defaults.clone();
    let path = root.join(SLIDE_META);

    match fs::read(&path) {
        Ok(bytes) => {
            let custom: Map<String, Value> = serde_json::from_slice(&bytes)
                .map_err(|source| SlideError::Metadata { path, source })?;
            merge_in(&mut meta, custom, MERGE_DEPTH);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => return Err(SlideError::Io { path, source }),
    }

    Ok(Value::Object(meta))
}
