//! Parser error types

use luagrep_ast::Span;
use luagrep_lexer::TokenKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("invalid token")]
    InvalidToken { span: Span },

    #[error("invalid expression")]
    InvalidExpression { span: Span },

    #[error("cannot assign to this expression")]
    InvalidAssignmentTarget { span: Span },

    #[error("syntax error: expression statement must be a call or an assignment")]
    InvalidStatement { span: Span },

    #[error("nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span, .. } => *span,
            ParseError::InvalidToken { span } => *span,
            ParseError::InvalidExpression { span } => *span,
            ParseError::InvalidAssignmentTarget { span } => *span,
            ParseError::InvalidStatement { span } => *span,
            ParseError::TooDeep { span, .. } => *span,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if found == TokenKind::Eof {
            return ParseError::UnexpectedEof {
                expected: expected.into(),
                span,
            };
        }
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }
}
