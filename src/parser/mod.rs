//! Parser for `${path}` templates

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, parse_with_syntax};
