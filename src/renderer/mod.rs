//! Template renderer

mod config;

pub use config::{ConfigError, Escape, RenderConfig};

use log::debug;

use crate::bindings::Bindings;
use crate::error::RenderError;
use crate::parser::{Segment, Template};

/// Render a template with default configuration
pub fn render(template: &Template, bindings: &Bindings) -> Result<String, RenderError> {
    render_with_config(template, bindings, &RenderConfig::default())
}

/// Render a template with custom configuration
///
/// Fails on the first placeholder that cannot be resolved to a scalar; no
/// partial output is returned.
pub fn render_with_config(
    template: &Template,
    bindings: &Bindings,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.literal_len());

    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(placeholder) => {
                let path = &placeholder.path;
                let value = bindings
                    .resolve(path)
                    .ok_or_else(|| RenderError::unresolved(path.to_string(), placeholder.span.clone()))?;
                let text = value
                    .as_scalar_str()
                    .ok_or_else(|| RenderError::non_scalar(path.to_string(), placeholder.span.clone()))?;

                match config.escape {
                    Escape::None => out.push_str(&text),
                    Escape::Html => escape_html_into(&text, &mut out),
                }
            }
        }
    }

    debug!(
        "rendered {} segments into {} bytes",
        template.segments().len(),
        out.len()
    );
    Ok(out)
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_html_into(s, &mut out);
    out
}

fn escape_html_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
