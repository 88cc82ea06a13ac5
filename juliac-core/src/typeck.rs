//! Static type checking: the second pipeline stage.
//!
//! Runs only after name resolution reported no errors. Each expression
//! is checked post-order; the visitor pushes the type it infers onto an
//! explicit stack and its caller pops however many operands it
//! consumes. A stack underflow means the checker itself has a bug, not
//! that the user's program is ill-typed, so it is treated as an
//! internal invariant violation rather than a diagnostic.

use juliac_parser::ast::{
    Atom, BinaryOp, Call, Declaration, Expression, Function, Instruction, MainFunction, Program,
    Type, UnaryOp,
};
use juliac_parser::Span;

use crate::diagnostics::Diagnostics;
use crate::symtab::{FunctionSymbol, SymbolTable};

/// An explicit stack of inferred expression types, per the traversal's
/// post-order contract.
#[derive(Debug, Default)]
struct TypeStack(Vec<Type>);

impl TypeStack {
    fn push(&mut self, ty: Type) {
        self.0.push(ty);
    }

    /// Pops one type. Underflow indicates the checker visited an
    /// expression node without producing a type for it — a bug, so it
    /// panics rather than surfacing as a user diagnostic.
    fn pop(&mut self) -> Type {
        self.0
            .pop()
            .expect("type stack underflow: checker invariant violated")
    }
}

struct Ctx<'a> {
    symbols: &'a SymbolTable,
    function: &'a FunctionSymbol,
    diagnostics: &'a mut Diagnostics,
    stack: TypeStack,
    has_return_seen: bool,
}

pub fn typecheck(program: &Program, symbols: &mut SymbolTable) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for function in &program.functions {
        check_function(function, symbols, &mut diagnostics);
    }
    check_main(&program.main, symbols, &mut diagnostics);

    diagnostics
}

fn is_numeric(ty: Type) -> bool {
    matches!(ty, Type::Integer | Type::Float64)
}

/// The narrow implicit widening rule: Integer is accepted where
/// Float64 is expected; nothing else widens.
fn assignable(value: Type, target: Type) -> bool {
    value == target || (value == Type::Integer && target == Type::Float64)
}

fn check_function(function: &Function, symbols: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    let snapshot = match symbols.get(&function.name) {
        Some(sym) => sym.clone(),
        None => return,
    };
    let has_return = {
        let mut ctx = Ctx {
            symbols: &*symbols,
            function: &snapshot,
            diagnostics: &mut *diagnostics,
            stack: TypeStack::default(),
            has_return_seen: false,
        };

        check_body(
            &function.body.declarations,
            &function.body.instructions,
            &mut ctx,
        );

        ctx.has_return_seen
    };

    if let Some(sym) = symbols.get_mut(&function.name) {
        sym.has_return = has_return;
    }
    if function.return_type.is_some() && !has_return {
        diagnostics.push(function.span, "missing return statement".to_string());
    }
}

fn check_main(main: &MainFunction, symbols: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    let snapshot = match symbols.get("main") {
        Some(sym) => sym.clone(),
        None => return,
    };
    let mut ctx = Ctx {
        symbols: &*symbols,
        function: &snapshot,
        diagnostics: &mut *diagnostics,
        stack: TypeStack::default(),
        has_return_seen: false,
    };
    check_body(&main.body.declarations, &main.body.instructions, &mut ctx);
    // main's return type is always Void; a bare `return` is legal but
    // never required.
}

fn check_body(declarations: &[Declaration], instructions: &[Instruction], ctx: &mut Ctx) {
    for decl in declarations {
        check_declaration(decl, ctx);
    }
    for instruction in instructions {
        check_instruction(instruction, ctx);
    }
}

fn check_declaration(decl: &Declaration, ctx: &mut Ctx) {
    check_expression(&decl.value, ctx);
    let value_ty = ctx.stack.pop();
    if !assignable(value_ty, decl.ty) {
        ctx.diagnostics.push(
            decl.span,
            format!(
                "wrong value type for variable: '{}', expected: '{}', got: '{}'",
                decl.name, decl.ty, value_ty
            ),
        );
    }
}

fn check_instruction(instruction: &Instruction, ctx: &mut Ctx) {
    match instruction {
        Instruction::Assignment { name, value, span } => {
            check_expression(value, ctx);
            let value_ty = ctx.stack.pop();
            match ctx.function.local_type(name) {
                Some(target) => {
                    if !assignable(value_ty, target) {
                        ctx.diagnostics.push(
                            *span,
                            format!(
                                "wrong value type for variable: '{name}', expected: '{target}', got: '{value_ty}'"
                            ),
                        );
                    }
                }
                None => ctx
                    .diagnostics
                    .push(*span, format!("use without declaration: '{name}'")),
            }
        }
        Instruction::Block { instructions, .. } => {
            for i in instructions {
                check_instruction(i, ctx);
            }
        }
        Instruction::If {
            condition,
            then_branch,
            else_branch,
            span,
        } => {
            check_condition(condition, *span, ctx);
            for i in then_branch {
                check_instruction(i, ctx);
            }
            if let Some(else_branch) = else_branch {
                for i in else_branch {
                    check_instruction(i, ctx);
                }
            }
        }
        Instruction::While {
            condition,
            body,
            span,
        } => {
            check_condition(condition, *span, ctx);
            for i in body {
                check_instruction(i, ctx);
            }
        }
        Instruction::Print { value, .. } => {
            if let Some(value) = value {
                check_expression(value, ctx);
                ctx.stack.pop();
            }
        }
        Instruction::CallStatement { call, .. } => {
            check_call(call, ctx);
        }
        Instruction::Return { value, span } => {
            let actual = match value {
                Some(expr) => {
                    check_expression(expr, ctx);
                    Some(ctx.stack.pop())
                }
                None => None,
            };
            match (ctx.function.return_type, actual) {
                (None, None) => {}
                (Some(expected), Some(actual)) if assignable(actual, expected) => {}
                (expected, actual) => {
                    ctx.diagnostics.push(
                        *span,
                        format!(
                            "wrong return type, expected: '{}', got: '{}'",
                            expected.map(|t| t.name().to_string()).unwrap_or_else(|| "Void".to_string()),
                            actual.map(|t| t.name().to_string()).unwrap_or_else(|| "Void".to_string()),
                        ),
                    );
                }
            }
            ctx.has_return_seen = true;
        }
    }
}

fn check_condition(expr: &Expression, span: Span, ctx: &mut Ctx) {
    check_expression(expr, ctx);
    let ty = ctx.stack.pop();
    if ty != Type::Bool {
        ctx.diagnostics.push(
            span,
            format!("condition must be Bool, got: '{ty}'"),
        );
    }
}

/// Checks argument arity and types, returning the callee's return type
/// (`None` for Void). Does not touch the type stack; callers push a
/// value only when the call appears in a position that needs one.
fn check_call(call: &Call, ctx: &mut Ctx) -> Option<Type> {
    match ctx.symbols.get(&call.callee) {
        Some(callee) => {
            if callee.parameters.len() != call.args.len() {
                ctx.diagnostics.push(
                    call.span,
                    format!(
                        "wrong number of arguments for '{}': expected {}, got {}",
                        call.callee,
                        callee.parameters.len(),
                        call.args.len()
                    ),
                );
            }
            let param_types: Vec<Type> = callee.parameters.iter().map(|(_, t)| *t).collect();
            for (i, arg) in call.args.iter().enumerate() {
                check_expression(arg, ctx);
                let arg_ty = ctx.stack.pop();
                if let Some(expected) = param_types.get(i) {
                    // Call-site arguments require an exact type match;
                    // unlike declarations and assignments, no widening
                    // is allowed here.
                    if arg_ty != *expected {
                        ctx.diagnostics.push(
                            arg.span(),
                            format!("wrong argument type: '{arg_ty}', expected: '{expected}'"),
                        );
                    }
                }
            }
            callee.return_type
        }
        None => {
            ctx.diagnostics.push(
                call.span,
                format!("call to undeclared function: '{}'", call.callee),
            );
            for arg in &call.args {
                check_expression(arg, ctx);
                ctx.stack.pop();
            }
            None
        }
    }
}

fn check_expression(expr: &Expression, ctx: &mut Ctx) {
    match expr {
        Expression::Unary { op, operand, span } => {
            check_expression(operand, ctx);
            let operand_ty = ctx.stack.pop();
            let result = match op {
                UnaryOp::Plus | UnaryOp::Minus => {
                    if !is_numeric(operand_ty) {
                        ctx.diagnostics.push(
                            *span,
                            format!("unary +/- requires a numeric operand, got: '{operand_ty}'"),
                        );
                    }
                    operand_ty
                }
                UnaryOp::Not => {
                    if operand_ty != Type::Bool {
                        ctx.diagnostics.push(
                            *span,
                            format!("unary ! requires a Bool operand, got: '{operand_ty}'"),
                        );
                    }
                    Type::Bool
                }
            };
            ctx.stack.push(result);
        }
        Expression::Binary {
            op,
            left,
            right,
            span,
        } => {
            check_expression(left, ctx);
            let left_ty = ctx.stack.pop();
            check_expression(right, ctx);
            let right_ty = ctx.stack.pop();
            ctx.stack.push(check_binary(*op, left_ty, right_ty, *span, ctx.diagnostics));
        }
        Expression::Call(call) => {
            let span = call.span;
            let callee = call.callee.clone();
            match check_call(call, ctx) {
                Some(ty) => ctx.stack.push(ty),
                None => {
                    ctx.diagnostics.push(
                        span,
                        format!("cannot use result of void function '{callee}' as a value"),
                    );
                    ctx.stack.push(Type::Integer);
                }
            }
        }
        Expression::Atom(atom) => check_atom(atom, ctx),
    }
}

fn check_binary(
    op: BinaryOp,
    left: Type,
    right: Type,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Type {
    use BinaryOp::*;
    match op {
        Mul | Div | Rem | Add | Sub => {
            if !is_numeric(left) || !is_numeric(right) {
                diagnostics.push(
                    span,
                    format!("arithmetic requires numeric operands, got: '{left}' and '{right}'"),
                );
                return Type::Integer;
            }
            // Integer/Integer division truncates (emits idiv); mixing
            // in a Float64 operand promotes the whole expression.
            if left == Type::Integer && right == Type::Integer {
                Type::Integer
            } else {
                Type::Float64
            }
        }
        Eq | NotEq => {
            if is_numeric(left) && is_numeric(right) {
                Type::Bool
            } else if left == right {
                Type::Bool
            } else {
                diagnostics.push(
                    span,
                    format!("cannot compare '{left}' and '{right}' for equality"),
                );
                Type::Bool
            }
        }
        Lt | LtEq | Gt | GtEq => {
            if !is_numeric(left) || !is_numeric(right) {
                diagnostics.push(
                    span,
                    format!("ordering comparison requires numeric operands, got: '{left}' and '{right}'"),
                );
            }
            Type::Bool
        }
        And | Or => {
            if left != Type::Bool || right != Type::Bool {
                diagnostics.push(
                    span,
                    format!("logical operator requires Bool operands, got: '{left}' and '{right}'"),
                );
            }
            Type::Bool
        }
    }
}

fn check_atom(atom: &Atom, ctx: &mut Ctx) {
    let ty = match atom {
        Atom::Identifier { name, span } => match ctx.function.local_type(name) {
            Some(ty) => ty,
            None => {
                ctx.diagnostics
                    .push(*span, format!("use without declaration: '{name}'"));
                Type::Integer
            }
        },
        Atom::Paren { inner, .. } => {
            check_expression(inner, ctx);
            ctx.stack.pop()
        }
        Atom::IntLiteral { .. } => Type::Integer,
        Atom::FloatLiteral { .. } => Type::Float64,
        Atom::BoolLiteral { .. } => Type::Bool,
        Atom::StringLiteral { .. } => Type::String,
    };
    ctx.stack.push(ty);
}
