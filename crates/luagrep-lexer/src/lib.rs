//! luagrep Lexer - Tokenization using logos
//!
//! Handles the Lua dialect the matcher is used on:
//! - long strings and long comments (`[==[ ... ]==]`, `--[[ ... ]]`)
//! - compound assignment operators (`+=`, `..=`, ...)
//! - bitwise operators and floor division (`&`, `|`, `~`, `<<`, `>>`, `//`)

mod token;

pub use token::*;

use logos::Logos;
use luagrep_ast::Span;

/// Tokenize a source string into a vector of tokens
///
/// Comments are dropped; unrecognised input becomes `TokenKind::Error`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(TokenKind::Comment) => continue,
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        tokens.push(Token { kind, span });
    }

    // Add EOF token
    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}
