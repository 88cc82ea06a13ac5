//! Statement-level grammar: function headers, bodies, and instructions.

use crate::ast::{
    Call, Declaration, Function, FunctionBody, Instruction, MainFunction, Param, Type,
};
use crate::error::{ParseResult, SyntaxError};
use crate::token::Token;

use super::{ParsedFunction, Parser};

impl<'a> Parser<'a> {
    pub(super) fn parse_function_or_main(&mut self) -> ParseResult<ParsedFunction> {
        let start = self.current_span();
        self.expect(Token::KwFunction)?;

        if self.check(Token::KwMain) {
            self.advance();
            self.expect(Token::LParen)?;
            self.expect(Token::RParen)?;
            let body = self.parse_body()?;
            let end = self.expect(Token::KwEnd)?.span;
            return Ok(ParsedFunction::Main(MainFunction {
                body,
                span: start.merge(&end),
            }));
        }

        let (name, _) = self.expect_identifier()?;
        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(Token::RParen)?;

        let return_type = if self.check(Token::DoubleColon) {
            self.advance();
            Some(self.parse_type_name()?)
        } else {
            None
        };

        let body = self.parse_body()?;
        let end = self.expect(Token::KwEnd)?.span;

        Ok(ParsedFunction::Named(Function {
            name,
            params,
            return_type,
            body,
            span: start.merge(&end),
        }))
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(Token::RParen) {
            return Ok(params);
        }
        loop {
            let (name, name_span) = self.expect_identifier()?;
            self.expect(Token::DoubleColon)?;
            let ty_tok_span = self.current_span();
            let ty = self.parse_type_name()?;
            params.push(Param {
                name,
                ty,
                span: name_span.merge(&ty_tok_span),
            });
            if self.check(Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(params)
    }

    fn parse_type_name(&mut self) -> ParseResult<Type> {
        let (name, span) = self.expect_identifier()?;
        Type::from_name(&name).ok_or(SyntaxError::InvalidSyntax {
            message: format!("unknown type name '{name}'"),
            span,
        })
    }

    fn parse_body(&mut self) -> ParseResult<FunctionBody> {
        let start = self.current_span();
        let mut declarations = Vec::new();

        while self.looks_like_declaration() {
            declarations.push(self.parse_declaration()?);
        }

        let mut instructions = Vec::new();
        while !self.check(Token::KwEnd) && !self.check(Token::KwElse) && self.peek().is_some() {
            instructions.push(self.parse_instruction()?);
        }

        let end = self.current_span();
        Ok(FunctionBody {
            declarations,
            instructions,
            span: start.merge(&end),
        })
    }

    /// Declarations form a prologue: `name :: Type = expr` at the head of
    /// the body, before any other instruction.
    fn looks_like_declaration(&mut self) -> bool {
        matches!(self.peek(), Some(Token::Identifier)) && self.peek_next() == Some(Token::DoubleColon)
    }

    fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        let (name, start) = self.expect_identifier()?;
        self.expect(Token::DoubleColon)?;
        let ty = self.parse_type_name()?;
        self.expect(Token::Eq)?;
        let value = self.parse_expression()?;
        let end = value.span();
        Ok(Declaration {
            name,
            ty,
            value,
            span: start.merge(&end),
        })
    }

    fn parse_instruction(&mut self) -> ParseResult<Instruction> {
        match self.peek() {
            Some(Token::KwIf) => self.parse_if(),
            Some(Token::KwWhile) => self.parse_while(),
            Some(Token::KwPrintln) => self.parse_print(),
            Some(Token::KwReturn) => self.parse_return(),
            Some(Token::Identifier) | Some(Token::KwMain) => self.parse_identifier_led_instruction(),
            Some(_) => {
                let tok = self.current.unwrap();
                Err(SyntaxError::UnexpectedToken {
                    found: tok.text.to_string(),
                    expected: "statement".to_string(),
                    span: tok.span,
                })
            }
            None => Err(SyntaxError::UnexpectedEof {
                expected: "statement".to_string(),
            }),
        }
    }

    fn parse_if(&mut self) -> ParseResult<Instruction> {
        let start = self.current_span();
        self.expect(Token::KwIf)?;
        let condition = self.parse_expression()?;
        let mut then_branch = Vec::new();
        while !self.check(Token::KwElse) && !self.check(Token::KwEnd) {
            then_branch.push(self.parse_instruction()?);
        }
        let else_branch = if self.check(Token::KwElse) {
            self.advance();
            let mut body = Vec::new();
            while !self.check(Token::KwEnd) {
                body.push(self.parse_instruction()?);
            }
            Some(body)
        } else {
            None
        };
        let end = self.expect(Token::KwEnd)?.span;
        Ok(Instruction::If {
            condition,
            then_branch,
            else_branch,
            span: start.merge(&end),
        })
    }

    fn parse_while(&mut self) -> ParseResult<Instruction> {
        let start = self.current_span();
        self.expect(Token::KwWhile)?;
        let condition = self.parse_expression()?;
        let mut body = Vec::new();
        while !self.check(Token::KwEnd) {
            body.push(self.parse_instruction()?);
        }
        let end = self.expect(Token::KwEnd)?.span;
        Ok(Instruction::While {
            condition,
            body,
            span: start.merge(&end),
        })
    }

    fn parse_print(&mut self) -> ParseResult<Instruction> {
        let start = self.current_span();
        self.expect(Token::KwPrintln)?;
        self.expect(Token::LParen)?;
        if self.check(Token::RParen) {
            let end = self.expect(Token::RParen)?.span;
            return Ok(Instruction::Print {
                value: None,
                span: start.merge(&end),
            });
        }
        let value = self.parse_expression()?;
        let end = self.expect(Token::RParen)?.span;
        Ok(Instruction::Print {
            value: Some(value),
            span: start.merge(&end),
        })
    }

    fn parse_return(&mut self) -> ParseResult<Instruction> {
        let start = self.current_span();
        self.expect(Token::KwReturn)?;
        if self.statement_follows() {
            Ok(Instruction::Return {
                value: None,
                span: start,
            })
        } else {
            let value = self.parse_expression()?;
            let end = value.span();
            Ok(Instruction::Return {
                value: Some(value),
                span: start.merge(&end),
            })
        }
    }

    /// True if the current token can only begin a new statement (or end
    /// the enclosing block), meaning a preceding `return` had no
    /// expression.
    fn statement_follows(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::KwEnd) | Some(Token::KwElse) | None
        )
    }

    fn parse_identifier_led_instruction(&mut self) -> ParseResult<Instruction> {
        let (name, start) = self.expect_identifier_or_main()?;

        if self.check(Token::Eq) {
            self.advance();
            let value = self.parse_expression()?;
            let end = value.span();
            return Ok(Instruction::Assignment {
                name,
                value,
                span: start.merge(&end),
            });
        }

        if self.check(Token::LParen) {
            self.advance();
            let args = self.parse_args()?;
            let end = self.expect(Token::RParen)?.span;
            return Ok(Instruction::CallStatement {
                call: Call {
                    callee: name,
                    args,
                    span: start.merge(&end),
                },
                span: start.merge(&end),
            });
        }

        Err(SyntaxError::UnexpectedToken {
            found: self
                .current
                .map(|t| t.text.to_string())
                .unwrap_or_default(),
            expected: "'=' or '('".to_string(),
            span: self.current_span(),
        })
    }

    pub(super) fn parse_args(&mut self) -> ParseResult<Vec<crate::ast::Expression>> {
        let mut args = Vec::new();
        if self.check(Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.check(Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(args)
    }
}
