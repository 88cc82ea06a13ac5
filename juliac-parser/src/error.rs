//! Parse error types.

use crate::span::Span;
use thiserror::Error;

/// Errors raised while lexing or parsing source text.
#[derive(Error, Debug, Clone)]
pub enum SyntaxError {
    #[error("unexpected token '{found}' at {span:?}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("invalid number literal '{literal}' at {span:?}")]
    InvalidNumber { literal: String, span: Span },

    #[error("unterminated string literal starting at {span:?}")]
    UnterminatedString { span: Span },

    #[error("{message} at {span:?}")]
    InvalidSyntax { message: String, span: Span },

    #[error("unrecognized token at {span:?}")]
    LexerError { span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Option<&Span> {
        match self {
            SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::InvalidNumber { span, .. }
            | SyntaxError::UnterminatedString { span }
            | SyntaxError::InvalidSyntax { span, .. }
            | SyntaxError::LexerError { span } => Some(span),
            SyntaxError::UnexpectedEof { .. } => None,
        }
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;
