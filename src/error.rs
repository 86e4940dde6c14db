//! Error types for parsing and rendering templates

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::Span;

/// Errors raised while parsing template source
///
/// Offsets are character offsets of the opening delimiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Placeholder body is not a dotted identifier path
    #[error("malformed placeholder '{text}' at offset {offset}")]
    MalformedPlaceholder {
        offset: usize,
        text: String,
        span: Span,
    },

    /// Opening delimiter is never closed
    #[error("unterminated placeholder at offset {offset}")]
    UnterminatedPlaceholder { offset: usize, span: Span },
}

impl ParseError {
    pub fn malformed(offset: usize, text: impl Into<String>, span: Span) -> Self {
        Self::MalformedPlaceholder {
            offset,
            text: text.into(),
            span,
        }
    }

    pub fn unterminated(offset: usize, span: Span) -> Self {
        Self::UnterminatedPlaceholder { offset, span }
    }

    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedPlaceholder { offset, .. } | Self::UnterminatedPlaceholder { offset, .. } => {
                *offset
            }
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::MalformedPlaceholder { span, .. } | Self::UnterminatedPlaceholder { span, .. } => {
                span
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let label = match self {
            Self::MalformedPlaceholder { .. } => {
                "expected a dotted identifier path like `user.name`".to_string()
            }
            Self::UnterminatedPlaceholder { .. } => "placeholder opened here is never closed".to_string(),
        };
        report(source, filename, self.span(), &self.to_string(), &label)
    }
}

/// Errors raised while rendering a parsed template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Path, or one of its intermediate keys, is absent from the bindings
    #[error("unresolved variable '{path}'")]
    UnresolvedVariable { path: String, span: Span },

    /// Path resolves to a map or list instead of a scalar
    #[error("variable '{path}' is not a scalar value")]
    NonScalarVariable { path: String, span: Span },
}

impl RenderError {
    pub fn unresolved(path: impl Into<String>, span: Span) -> Self {
        Self::UnresolvedVariable {
            path: path.into(),
            span,
        }
    }

    pub fn non_scalar(path: impl Into<String>, span: Span) -> Self {
        Self::NonScalarVariable {
            path: path.into(),
            span,
        }
    }

    /// Dotted path of the offending placeholder
    pub fn path(&self) -> &str {
        match self {
            Self::UnresolvedVariable { path, .. } | Self::NonScalarVariable { path, .. } => path,
        }
    }

    /// Span of the offending placeholder in the template source
    pub fn span(&self) -> &Span {
        match self {
            Self::UnresolvedVariable { span, .. } | Self::NonScalarVariable { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// `source` must be the text the template was parsed from.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let label = match self {
            Self::UnresolvedVariable { path, .. } => format!("no binding for '{}'", path),
            Self::NonScalarVariable { path, .. } => {
                format!("'{}' is a map or list, not a string, number or boolean", path)
            }
        };
        report(source, filename, self.span(), &self.to_string(), &label)
    }
}

fn report(source: &str, filename: &str, span: &Span, message: &str, label: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span.clone()))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", filename, message),
    }
}
