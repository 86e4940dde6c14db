//! Configuration for template rendering

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::parser::Syntax;

/// Errors that can occur when loading a render configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// How substituted values are escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escape {
    /// Values are substituted verbatim
    #[default]
    None,
    /// `&<>"'` in values become HTML entities; literal text is untouched
    Html,
}

/// Configuration options for parsing and rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Placeholder syntax used when parsing source text
    pub syntax: Syntax,

    /// Escaping applied to substituted values
    pub escape: Escape,
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder syntax
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Set the escaping mode
    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.escape = escape;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    ///
    /// ```toml
    /// syntax = "braces"
    /// escape = "html"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
