//! Page rendering behind a pluggable template engine.
//!
//! The shipped [`PlaceholderEngine`] understands `${dotted.path}` and
//! `${dotted.path?html}` (HTML-escaped) against a JSON context.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::utils::html::escape;

/// Where a template comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// A template file on disk (e.g. a slide's own `slide.tmpl`).
    File(PathBuf),
    /// A template compiled into the binary.
    BuiltIn {
        name: &'static str,
        content: &'static str,
    },
}

impl TemplateSource {
    fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::BuiltIn { name, .. } => (*name).to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template `{template}`: no value for `{key}`")]
    MissingValue { template: String, key: String },

    #[error("template `{template}`: unterminated `${{` at byte {offset}")]
    Syntax { template: String, offset: usize },
}

/// Renders a template against a JSON context.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, context: &Value, source: &TemplateSource) -> Result<Vec<u8>, RenderError>;
}

/// `${...}` substitution engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderEngine;

impl TemplateEngine for PlaceholderEngine {
    fn render(&self, context: &Value, source: &TemplateSource) -> Result<Vec<u8>, RenderError> {
        let text: Cow<'_, str> = match source {
            TemplateSource::File(path) => Cow::Owned(
                fs::read_to_string(path).map_err(|source| RenderError::Io {
                    path: path.clone(),
                    source,
                })?,
            ),
            TemplateSource::BuiltIn { content, .. } => Cow::Borrowed(content),
        };
        interpolate(&source.name(), &text, context).map(String::into_bytes)
    }
}

/// Substitute every `${...}` in `template`.
fn interpolate(name: &str, template: &str, context: &Value) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(RenderError::Syntax {
                template: name.to_string(),
                offset: template.len() - rest.len() + start,
            });
        };
        out.push_str(&evaluate(name, after[..end].trim(), context)?);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn evaluate(name: &str, expr: &str, context: &Value) -> Result<String, RenderError> {
    let (path, html) = match expr.strip_suffix("?html") {
        Some(path) => (path.trim_end(), true),
        None => (expr, false),
    };

    let value = path
        .split('.')
        .try_fold(context, |value, key| value.get(key))
        .ok_or_else(|| RenderError::MissingValue {
            template: name.to_string(),
            key: path.to_string(),
        })?;

    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(if html { escape(&text).into_owned() } else { text })
}
