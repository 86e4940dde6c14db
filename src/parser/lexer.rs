//! Lexer for placeholder bodies using logos

use logos::{Logos, Span};

#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    #[token(".")]
    Dot,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

/// Lex a placeholder body into tokens with spans
///
/// Returns `None` as soon as the body contains anything that is not an
/// identifier or a dot; whitespace is not skipped.
pub fn lex(input: &str) -> Option<Vec<(Token, Span)>> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| tok.ok().map(|t| (t, span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Option<Vec<Token>> {
        lex(input).map(|toks| toks.into_iter().map(|(t, _)| t).collect())
    }

    #[test]
    fn test_single_identifier() {
        assert_eq!(tokens("name"), Some(vec![Token::Ident("name".to_string())]));
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(
            tokens("user.role"),
            Some(vec![
                Token::Ident("user".to_string()),
                Token::Dot,
                Token::Ident("role".to_string()),
            ])
        );
    }

    #[test]
    fn test_underscores_and_digits() {
        assert_eq!(
            tokens("_x1.y_2"),
            Some(vec![
                Token::Ident("_x1".to_string()),
                Token::Dot,
                Token::Ident("y_2".to_string()),
            ])
        );
    }

    #[test]
    fn test_leading_digit_rejected() {
        assert_eq!(tokens("1bad"), None);
    }

    #[test]
    fn test_whitespace_rejected() {
        assert_eq!(tokens("a b"), None);
        assert_eq!(tokens(" a"), None);
    }

    #[test]
    fn test_expression_rejected() {
        assert_eq!(tokens("a+b"), None);
        assert_eq!(tokens("f()"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokens(""), Some(vec![]));
    }
}
