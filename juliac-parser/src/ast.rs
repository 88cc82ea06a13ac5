//! Typed abstract syntax tree produced by the parser.
//!
//! This is the shape later stages (name resolution, type checking, code
//! generation, liveness analysis) consume. It is built directly by the
//! parser rather than through an intermediate concrete syntax tree.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// The closed set of primitive types in the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Integer,
    Float64,
    Bool,
    String,
}

impl Type {
    /// Parses a type name as it appears after `::` in a declaration,
    /// parameter, or return-type annotation.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "Integer" => Some(Type::Integer),
            "Float64" => Some(Type::Float64),
            "Bool" => Some(Type::Bool),
            "String" => Some(Type::String),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Integer => "Integer",
            Type::Float64 => "Float64",
            Type::Bool => "Bool",
            Type::String => "String",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A whole source file: ordinary functions plus the distinguished entry
/// point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
    pub main: MainFunction,
}

/// A single `name :: Type` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

/// A function other than `main`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: FunctionBody,
    pub span: Span,
}

/// The distinguished `main` function: no parameters, no return type,
/// but takes the place of the program entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainFunction {
    pub body: FunctionBody,
    pub span: Span,
}

/// A declaration of a new local, `name :: Type = expr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub ty: Type,
    pub value: Expression,
    pub span: Span,
}

/// A function body: a prologue of declarations, then a sequence of
/// instructions, with an optional trailing return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionBody {
    pub declarations: Vec<Declaration>,
    pub instructions: Vec<Instruction>,
    pub span: Span,
}

/// A statement inside a function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Assignment {
        name: String,
        value: Expression,
        span: Span,
    },
    Block {
        instructions: Vec<Instruction>,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Vec<Instruction>,
        else_branch: Option<Vec<Instruction>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Vec<Instruction>,
        span: Span,
    },
    Print {
        value: Option<Expression>,
        span: Span,
    },
    CallStatement {
        call: Call,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
}

impl Instruction {
    pub fn span(&self) -> Span {
        match self {
            Instruction::Assignment { span, .. }
            | Instruction::Block { span, .. }
            | Instruction::If { span, .. }
            | Instruction::While { span, .. }
            | Instruction::Print { span, .. }
            | Instruction::CallStatement { span, .. }
            | Instruction::Return { span, .. } => *span,
        }
    }
}

/// A call expression, `name(args...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expression>,
    pub span: Span,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Binary operators, spanning arithmetic, comparison, and logical forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Call(Call),
    Atom(Atom),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Unary { span, .. } => *span,
            Expression::Binary { span, .. } => *span,
            Expression::Call(call) => call.span,
            Expression::Atom(atom) => atom.span(),
        }
    }
}

/// The leaves of an expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Atom {
    Identifier { name: String, span: Span },
    Paren { inner: Box<Expression>, span: Span },
    IntLiteral { value: i32, span: Span },
    FloatLiteral { value: f64, span: Span },
    BoolLiteral { value: bool, span: Span },
    StringLiteral { value: String, span: Span },
}

impl Atom {
    pub fn span(&self) -> Span {
        match self {
            Atom::Identifier { span, .. }
            | Atom::Paren { span, .. }
            | Atom::IntLiteral { span, .. }
            | Atom::FloatLiteral { span, .. }
            | Atom::BoolLiteral { span, .. }
            | Atom::StringLiteral { span, .. } => *span,
        }
    }
}
