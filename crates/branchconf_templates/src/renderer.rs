//! Template rendering gateway and the default EJS-subset renderer.

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// Key/value bag handed to a template.
pub type TemplateData = serde_json::Map<String, Value>;

/// Renders a template file with a data bag.
///
/// Implementations may perform I/O (reading the template, fetching partials)
/// and must be safe to call concurrently for different templates.
#[async_trait]
pub trait RenderGateway: Send + Sync {
    /// Render the template at `template` using `data`.
    async fn render(&self, template: &Path, data: &TemplateData) -> TemplateResult<String>;
}

/// Renderer for the output-tag subset of EJS.
///
/// Supported tags:
/// - `<%= key %>` emits the HTML-escaped value of `key`
/// - `<%- key %>` emits the raw value of `key`
///
/// Any other `<% ... %>` tag is rejected rather than copied through.
///
/// A renderer built with [`EjsRenderer::verbatim`] emits `<%= %>` values
/// unescaped, for text that is not HTML such as file paths.
pub struct EjsRenderer {
    tag_pattern: Regex,
    ident_pattern: Regex,
    escape: bool,
}

impl Default for EjsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EjsRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self {
            tag_pattern: Regex::new(r"(?s)<%(.*?)%>").expect("tag pattern is valid"),
            ident_pattern: Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$")
                .expect("identifier pattern is valid"),
            escape: true,
        }
    }

    /// Create a renderer that never HTML-escapes.
    pub fn verbatim() -> Self {
        Self {
            escape: false,
            ..Self::new()
        }
    }

    /// Render template source held in memory.
    pub fn render_str(&self, source: &str, data: &TemplateData) -> TemplateResult<String> {
        let mut output = String::with_capacity(source.len());
        let mut last = 0;

        for caps in self.tag_pattern.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            output.push_str(&source[last..whole.start()]);
            last = whole.end();

            let inner = &caps[1];
            let (escape, expr) = match inner.chars().next() {
                Some('=') => (true, &inner[1..]),
                Some('-') => (false, &inner[1..]),
                _ => {
                    return Err(TemplateError::RenderingFailed(format!(
                        "unsupported tag: {}",
                        whole.as_str()
                    )))
                }
            };

            let key = expr.trim();
            if !self.ident_pattern.is_match(key) {
                return Err(TemplateError::RenderingFailed(format!(
                    "unsupported expression: {}",
                    key
                )));
            }

            let value = data
                .get(key)
                .ok_or_else(|| TemplateError::MissingVariable(key.to_string()))?;
            let text = value_to_string(value);

            if escape && self.escape {
                output.push_str(&escape_html(&text));
            } else {
                output.push_str(&text);
            }
        }

        output.push_str(&source[last..]);
        Ok(output)
    }
}

#[async_trait]
impl RenderGateway for EjsRenderer {
    async fn render(&self, template: &Path, data: &TemplateData) -> TemplateResult<String> {
        let source = tokio::fs::read_to_string(template)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TemplateError::NotFound(template.to_path_buf()),
                _ => TemplateError::Io {
                    path: template.to_path_buf(),
                    source: e,
                },
            })?;

        debug!("Rendering template {:?}", template);
        self.render_str(&source, data)
    }
}

/// Display form of a data value.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
