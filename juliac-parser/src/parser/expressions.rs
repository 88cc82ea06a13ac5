//! Pratt-style expression parsing.

use crate::ast::{Atom, BinaryOp, Call, Expression, UnaryOp};
use crate::error::{ParseResult, SyntaxError};
use crate::token::{Precedence, Token};

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary(Precedence::Lowest)
    }

    fn parse_binary(&mut self, min_precedence: Precedence) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        while let Some(op_token) = self.peek() {
            let Some(precedence) = op_token.binary_precedence() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let next_min = bump(precedence);
            let right = self.parse_binary(next_min)?;
            let span = left.span().merge(&right.span());
            left = Expression::Binary {
                op: to_binary_op(op_token),
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        match self.peek() {
            Some(Token::Plus) | Some(Token::Minus) | Some(Token::Bang) => {
                let tok = self.current.unwrap();
                self.advance();
                let operand = self.parse_unary()?;
                let span = tok.span.merge(&operand.span());
                Ok(Expression::Unary {
                    op: match tok.token {
                        Token::Plus => UnaryOp::Plus,
                        Token::Minus => UnaryOp::Minus,
                        Token::Bang => UnaryOp::Not,
                        _ => unreachable!(),
                    },
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_call_or_atom(),
        }
    }

    fn parse_call_or_atom(&mut self) -> ParseResult<Expression> {
        let callee_token = matches!(self.peek(), Some(Token::Identifier) | Some(Token::KwMain));
        if callee_token && self.peek_next() == Some(Token::LParen) {
            let (name, start) = self.expect_identifier_or_main()?;
            self.expect(Token::LParen)?;
            let args = self.parse_args()?;
            let end = self.expect(Token::RParen)?.span;
            return Ok(Expression::Call(Call {
                callee: name,
                args,
                span: start.merge(&end),
            }));
        }
        self.parse_atom().map(Expression::Atom)
    }

    fn parse_atom(&mut self) -> ParseResult<Atom> {
        let tok = self.current.ok_or(SyntaxError::UnexpectedEof {
            expected: "expression".to_string(),
        })?;

        match tok.token {
            Token::Identifier => {
                self.advance();
                Ok(Atom::Identifier {
                    name: tok.text.to_string(),
                    span: tok.span,
                })
            }
            Token::IntegerNumber => {
                self.advance();
                let value = tok.text.parse::<i32>().map_err(|_| SyntaxError::InvalidNumber {
                    literal: tok.text.to_string(),
                    span: tok.span,
                })?;
                Ok(Atom::IntLiteral {
                    value,
                    span: tok.span,
                })
            }
            Token::FloatNumber => {
                self.advance();
                let value = tok.text.parse::<f64>().map_err(|_| SyntaxError::InvalidNumber {
                    literal: tok.text.to_string(),
                    span: tok.span,
                })?;
                Ok(Atom::FloatLiteral {
                    value,
                    span: tok.span,
                })
            }
            Token::StringLiteral => {
                self.advance();
                let inner = &tok.text[1..tok.text.len() - 1];
                Ok(Atom::StringLiteral {
                    value: unescape(inner),
                    span: tok.span,
                })
            }
            Token::KwTrue => {
                self.advance();
                Ok(Atom::BoolLiteral {
                    value: true,
                    span: tok.span,
                })
            }
            Token::KwFalse => {
                self.advance();
                Ok(Atom::BoolLiteral {
                    value: false,
                    span: tok.span,
                })
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let end = self.expect(Token::RParen)?.span;
                Ok(Atom::Paren {
                    inner: Box::new(inner),
                    span: tok.span.merge(&end),
                })
            }
            _ => Err(SyntaxError::UnexpectedToken {
                found: tok.text.to_string(),
                expected: "expression".to_string(),
                span: tok.span,
            }),
        }
    }
}

fn bump(p: Precedence) -> Precedence {
    use Precedence::*;
    match p {
        Lowest => Or,
        Or => And,
        And => Comparison,
        Comparison => Additive,
        Additive => Multiplicative,
        Multiplicative => Multiplicative,
    }
}

fn to_binary_op(token: Token) -> BinaryOp {
    match token {
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Rem,
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::EqEq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::NotEq,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::LtEq,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::GtEq,
        Token::AndAnd => BinaryOp::And,
        Token::OrOr => BinaryOp::Or,
        _ => unreachable!("not a binary operator token"),
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
