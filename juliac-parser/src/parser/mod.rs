//! Recursive-descent parser producing the typed AST directly.

mod expressions;
mod statements;

use crate::ast::Program;
use crate::error::{ParseResult, SyntaxError};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// Parses `source` into a [`Program`].
///
/// ```
/// use juliac_parser::parser::parse;
///
/// let program = parse("function main() end").unwrap();
/// assert!(program.functions.is_empty());
/// ```
pub fn parse(source: &str) -> Result<Program, Vec<SyntaxError>> {
    let source_map = SourceMap::new(source);
    let mut parser = Parser::new(source, &source_map);
    parser.parse_program()
}

pub struct Parser<'a> {
    source_map: &'a SourceMap,
    lexer: Lexer<'a>,
    current: Option<SpannedToken<'a>>,
    lookahead: Option<SpannedToken<'a>>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, source_map: &'a SourceMap) -> Self {
        let mut lexer = Lexer::new(source, source_map);
        let mut errors = Vec::new();
        let current = Self::pull(&mut lexer, &mut errors);
        let lookahead = Self::pull(&mut lexer, &mut errors);
        Self {
            source_map,
            lexer,
            current,
            lookahead,
            errors,
        }
    }

    fn pull(
        lexer: &mut Lexer<'a>,
        errors: &mut Vec<SyntaxError>,
    ) -> Option<SpannedToken<'a>> {
        loop {
            match lexer.next_token()? {
                Ok(tok) => return Some(tok),
                Err(err) => errors.push(err),
            }
        }
    }

    fn parse_program(&mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut functions = Vec::new();
        let mut main = None;

        while self.current.is_some() {
            match self.parse_function_or_main() {
                Ok(ParsedFunction::Named(f)) => functions.push(f),
                Ok(ParsedFunction::Main(m)) => main = Some(m),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            match main {
                Some(main) => Ok(Program { functions, main }),
                None => {
                    self.errors.push(SyntaxError::InvalidSyntax {
                        message: "program has no 'main' function".to_string(),
                        span: Span::empty(),
                    });
                    Err(std::mem::take(&mut self.errors))
                }
            }
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let next = Self::pull(&mut self.lexer, &mut self.errors);
        let new_lookahead = std::mem::replace(&mut self.lookahead, next);
        std::mem::replace(&mut self.current, new_lookahead)
    }

    fn peek(&self) -> Option<Token> {
        self.current.map(|t| t.token)
    }

    fn peek_next(&self) -> Option<Token> {
        self.lookahead.map(|t| t.token)
    }

    fn check(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    fn current_span(&self) -> Span {
        self.current.map(|t| t.span).unwrap_or_else(Span::empty)
    }

    fn expect(&mut self, token: Token) -> ParseResult<SpannedToken<'a>> {
        match self.current {
            Some(tok) if tok.token == token => {
                self.advance();
                Ok(tok)
            }
            Some(tok) => Err(SyntaxError::UnexpectedToken {
                found: tok.text.to_string(),
                expected: token.describe().to_string(),
                span: tok.span,
            }),
            None => Err(SyntaxError::UnexpectedEof {
                expected: token.describe().to_string(),
            }),
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<(String, Span)> {
        match self.current {
            Some(tok) if tok.token == Token::Identifier => {
                self.advance();
                Ok((tok.text.to_string(), tok.span))
            }
            Some(tok) => Err(SyntaxError::UnexpectedToken {
                found: tok.text.to_string(),
                expected: "identifier".to_string(),
                span: tok.span,
            }),
            None => Err(SyntaxError::UnexpectedEof {
                expected: "identifier".to_string(),
            }),
        }
    }

    /// Like [`Self::expect_identifier`], but also accepts `main` as a
    /// callee name — `main` is a keyword everywhere else, but a program
    /// may recursively call its own entry point.
    fn expect_identifier_or_main(&mut self) -> ParseResult<(String, Span)> {
        match self.current {
            Some(tok) if tok.token == Token::Identifier || tok.token == Token::KwMain => {
                self.advance();
                Ok((tok.text.to_string(), tok.span))
            }
            Some(tok) => Err(SyntaxError::UnexpectedToken {
                found: tok.text.to_string(),
                expected: "identifier".to_string(),
                span: tok.span,
            }),
            None => Err(SyntaxError::UnexpectedEof {
                expected: "identifier".to_string(),
            }),
        }
    }

    /// Skips tokens until a likely statement boundary, so one syntax
    /// error does not cascade into unrelated ones.
    fn synchronize(&mut self) {
        while let Some(tok) = self.current {
            if matches!(tok.token, Token::KwFunction | Token::KwEnd) {
                return;
            }
            self.advance();
        }
    }
}

enum ParsedFunction {
    Named(crate::ast::Function),
    Main(crate::ast::MainFunction),
}
