//! Template scanner and placeholder path grammar
//!
//! Literal text is scanned with plain string searches for the delimiters of
//! the selected [`Syntax`]. Each placeholder body is lexed with logos and
//! parsed with chumsky into a [`VariablePath`].

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use log::trace;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};

/// Parse template source in the canonical `${path}` syntax
pub fn parse(source: &str) -> Result<Template, ParseError> {
    parse_with_syntax(source, Syntax::default())
}

/// Parse template source with the given placeholder syntax
pub fn parse_with_syntax(source: &str, syntax: Syntax) -> Result<Template, ParseError> {
    let open = syntax.open();
    let close = syntax.close();

    let mut offsets = CharOffsets::new(source);
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(rel) = source[pos..].find(open) {
        let start = pos + rel;

        literal.push_str(&source[pos..start]);
        let offset = offsets.at(start);
        let body_start = start + open.len();

        let Some(body_len) = source[body_start..].find(close) else {
            let end = offsets.at(source.len());
            return Err(ParseError::unterminated(offset, offset..end));
        };
        let body_end = body_start + body_len;
        let end = body_end + close.len();
        let span = offset..offsets.at(end);

        let raw = &source[body_start..body_end];
        let body = if syntax.trims_body() { raw.trim() } else { raw };
        let path = parse_path(body).ok_or_else(|| ParseError::malformed(offset, raw, span.clone()))?;

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Placeholder(Placeholder { path, span }));
        pos = end;
    }

    literal.push_str(&source[pos..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    trace!("parsed template into {} segments", segments.len());
    Ok(Template::new(segments, syntax))
}

/// Parse a placeholder body into a dotted path
fn parse_path(body: &str) -> Option<VariablePath> {
    let len = body.len();
    let tokens = lexer::lex(body)?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    path_parser().parse(token_stream).into_result().ok()
}

fn path_parser<'a, I>() -> impl Parser<'a, I, VariablePath, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => s,
    };

    identifier
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(VariablePath::new)
}

/// Converts increasing byte offsets into character offsets in one pass
struct CharOffsets<'a> {
    source: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte`; calls must not go backwards
    fn at(&mut self, byte: usize) -> usize {
        self.chars += self.source[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}
