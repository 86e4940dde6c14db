//! Syntax tree types for parsed templates

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

/// Character range in source text
pub type Span = std::ops::Range<usize>;

/// Placeholder delimiter syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `${path}`
    #[default]
    Dollar,
    /// `{{ path }}`, whitespace inside the braces is ignored
    Braces,
}

impl Syntax {
    /// Opening delimiter
    pub fn open(&self) -> &'static str {
        match self {
            Syntax::Dollar => "${",
            Syntax::Braces => "{{",
        }
    }

    /// Closing delimiter
    pub fn close(&self) -> &'static str {
        match self {
            Syntax::Dollar => "}",
            Syntax::Braces => "}}",
        }
    }

    /// Whether whitespace around the placeholder body is ignored
    pub fn trims_body(&self) -> bool {
        matches!(self, Syntax::Braces)
    }
}

/// A dotted variable reference like `user.role`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariablePath(Vec<String>);

impl VariablePath {
    pub fn new(components: Vec<String>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// First component, the key looked up in the top-level bindings
    pub fn root(&self) -> &str {
        self.0.first().map(|s| s.as_str()).unwrap_or_default()
    }
}

impl fmt::Display for VariablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A delimited reference to a variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub path: VariablePath,
    /// Span of the whole placeholder, delimiters included
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A parsed template
///
/// Immutable once built; a single template can be rendered any number of
/// times, from any number of threads, with different bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    syntax: Syntax,
}

impl Template {
    pub(crate) fn new(segments: Vec<Segment>, syntax: Syntax) -> Self {
        Self { segments, syntax }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Iterate over placeholders in template order
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> + '_ {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Distinct referenced paths, in order of first occurrence
    pub fn variables(&self) -> Vec<&VariablePath> {
        let mut seen = HashSet::new();
        self.placeholders()
            .map(|p| &p.path)
            .filter(|path| seen.insert(*path))
            .collect()
    }

    /// True when the template contains no placeholders
    pub fn is_literal(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Total length of the literal text, used to size render buffers
    pub(crate) fn literal_len(&self) -> usize {
        self.segments
            .iter()
            .map(|seg| match seg {
                Segment::Literal(s) => s.len(),
                Segment::Placeholder(_) => 0,
            })
            .sum()
    }
}
