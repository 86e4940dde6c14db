//! Prompt store records
//!
//! The prompt store serves records like
//!
//! ```json
//! {
//!   "id": 1,
//!   "name": "greeting-template",
//!   "text": "Hello ${name}! Welcome to ${platform}.",
//!   "description": "A greeting template",
//!   "meta": { "template_variables": ["name", "platform"], "author": "test-user" },
//!   "tags": [{ "id": 3, "name": "greeting" }]
//! }
//! ```
//!
//! Only `text` feeds the renderer. `meta.template_variables` is checked
//! against the variables the template actually references.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::error::ParseError;
use crate::parser::{parse_with_syntax, Syntax, Template};

/// Errors that can occur when loading prompt records
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to read prompt file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse prompt JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A tag as sent on create (plain name) or returned by the store (record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    Name(String),
    Record { id: i64, name: String },
}

impl Tag {
    pub fn name(&self) -> &str {
        match self {
            Tag::Name(name) | Tag::Record { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptMeta {
    /// Variables the author declares the template uses
    #[serde(default, deserialize_with = "null_as_default")]
    pub template_variables: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Any other meta keys, kept as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A prompt record as stored by the prompt store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PromptMeta>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    /// Earlier revisions of the text, as returned by the store
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<PromptVersion>,
}

/// A stored revision of a prompt's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<i64>,
    pub version: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PromptMeta>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Mismatch between declared and referenced template variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableCheck {
    /// Referenced by the template but not declared in meta
    pub undeclared: Vec<String>,
    /// Declared in meta but never referenced
    pub unused: Vec<String>,
}

impl VariableCheck {
    pub fn is_consistent(&self) -> bool {
        self.undeclared.is_empty() && self.unused.is_empty()
    }
}

impl PromptRecord {
    pub fn from_json(content: &str) -> Result<Self, PromptError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, PromptError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse the record's text as a template
    pub fn template(&self, syntax: Syntax) -> Result<Template, ParseError> {
        parse_with_syntax(&self.text, syntax)
    }

    pub fn declared_variables(&self) -> &[String] {
        self.meta
            .as_ref()
            .map(|m| m.template_variables.as_slice())
            .unwrap_or_default()
    }

    /// The record as it was at `version`
    ///
    /// Text and meta come from the matching entry in `versions`; a version
    /// without its own meta keeps the record's. The record's current
    /// version is always available, even when `versions` omits it.
    pub fn at_version(&self, version: i64) -> Option<PromptRecord> {
        if let Some(found) = self.versions.iter().find(|v| v.version == version) {
            return Some(PromptRecord {
                text: found.text.clone(),
                version: Some(found.version),
                meta: found.meta.clone().or_else(|| self.meta.clone()),
                ..self.clone()
            });
        }
        (self.version == Some(version)).then(|| self.clone())
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tags.iter().map(Tag::name)
    }

    /// Compare declared variables with the ones the template references
    ///
    /// Dotted references count against their first component, so
    /// `${user.role}` satisfies a declaration of `user`.
    pub fn check_variables(&self, template: &Template) -> VariableCheck {
        let declared: HashSet<&str> = self.declared_variables().iter().map(|s| s.as_str()).collect();

        let mut referenced = Vec::new();
        for path in template.variables() {
            if !referenced.contains(&path.root()) {
                referenced.push(path.root());
            }
        }

        VariableCheck {
            undeclared: referenced
                .iter()
                .filter(|r| !declared.contains(*r))
                .map(|r| r.to_string())
                .collect(),
            unused: self
                .declared_variables()
                .iter()
                .filter(|d| !referenced.contains(&d.as_str()))
                .cloned()
                .collect(),
        }
    }
}
