//! Wraps the generated `logos` lexer with span and source-text tracking.

use logos::Logos;

use crate::error::SyntaxError;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A single token together with its source span and underlying text.
#[derive(Debug, Clone, Copy)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

/// Iterator-style lexer over a source string.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: &'a SourceMap,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, source_map: &'a SourceMap) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map,
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, SyntaxError>> {
        let result = self.inner.next()?;
        let range = self.inner.span();
        let span = self.source_map.span(range.start, range.end);
        let text = &self.source[range.clone()];
        match result {
            Ok(token) => Some(Ok(SpannedToken { token, span, text })),
            Err(()) => Some(Err(SyntaxError::LexerError { span })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_spanned_tokens_in_order() {
        let source = "function main end";
        let map = SourceMap::new(source);
        let mut lexer = Lexer::new(source, &map);
        let first = lexer.next_token().unwrap().unwrap();
        assert_eq!(first.token, Token::KwFunction);
        assert_eq!(first.text, "function");
        let second = lexer.next_token().unwrap().unwrap();
        assert_eq!(second.token, Token::KwMain);
        assert_eq!(second.span.start_column, 10);
    }

    #[test]
    fn reports_lexer_error_for_unknown_character() {
        let source = "@";
        let map = SourceMap::new(source);
        let mut lexer = Lexer::new(source, &map);
        assert!(matches!(
            lexer.next_token(),
            Some(Err(SyntaxError::LexerError { .. }))
        ));
    }
}
