//! Prompt Template - safe variable substitution for stored prompts
//!
//! Templates reference variables with `${name}` or dotted paths like
//! `${user.role}`. Nothing inside a placeholder is evaluated: a body that
//! is not an identifier path is a parse error, and a path that does not
//! resolve to a string, number, or boolean is a render error.
//!
//! # Example
//!
//! ```rust
//! use prompt_template::{parse, render, Bindings};
//!
//! let template = parse("Hello ${name}! Welcome to ${platform}.").unwrap();
//! let bindings = Bindings::new()
//!     .with("name", "John")
//!     .with("platform", "Exemplar Prompt Hub");
//!
//! assert_eq!(
//!     render(&template, &bindings).unwrap(),
//!     "Hello John! Welcome to Exemplar Prompt Hub."
//! );
//! ```

pub mod bindings;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod renderer;

pub use bindings::{Bindings, BindingsError, Value};
pub use error::{ParseError, RenderError};
pub use parser::{parse, parse_with_syntax, Syntax, Template, VariablePath};
pub use prompt::{PromptError, PromptMeta, PromptRecord, PromptVersion, Tag, VariableCheck};
pub use renderer::{render, render_with_config, ConfigError, Escape, RenderConfig};

use thiserror::Error;

/// Errors that can occur when parsing and rendering in one step
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Error during parsing
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error during rendering
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            Error::Parse(e) => e.format(source, filename),
            Error::Render(e) => e.format(source, filename),
        }
    }
}

/// Parse and render source text with default configuration
///
/// # Example
///
/// ```rust
/// use prompt_template::{render_str, Bindings, Error};
///
/// let mut bindings = Bindings::new();
/// bindings.set_path("user.role", "Developer").unwrap();
///
/// assert_eq!(render_str("Role: ${user.role}", &bindings).unwrap(), "Role: Developer");
/// assert!(matches!(render_str("${user}", &bindings), Err(Error::Render(_))));
/// ```
pub fn render_str(source: &str, bindings: &Bindings) -> Result<String, Error> {
    render_str_with_config(source, bindings, &RenderConfig::default())
}

/// Parse and render source text with custom configuration
///
/// # Example
///
/// ```rust
/// use prompt_template::{render_str_with_config, Bindings, Escape, RenderConfig, Syntax};
///
/// let config = RenderConfig::new()
///     .with_syntax(Syntax::Braces)
///     .with_escape(Escape::Html);
/// let bindings = Bindings::new().with("name", "<John>");
///
/// let out = render_str_with_config("<p>Hello {{ name }}</p>", &bindings, &config).unwrap();
/// assert_eq!(out, "<p>Hello &lt;John&gt;</p>");
/// ```
pub fn render_str_with_config(
    source: &str,
    bindings: &Bindings,
    config: &RenderConfig,
) -> Result<String, Error> {
    let template = parse_with_syntax(source, config.syntax)?;
    Ok(render_with_config(&template, bindings, config)?)
}
