//! Symbol-table construction: the first pipeline stage.
//!
//! One pass per function registers its parameters and locals and
//! checks that every identifier used in an expression was declared.
//! Errors are collected rather than raised immediately; if any were
//! found, later stages must not run.

use juliac_parser::ast::{Atom, Call, Declaration, Expression, Function, Instruction, MainFunction, Program};

use crate::diagnostics::Diagnostics;
use crate::symtab::{FunctionSymbol, SymbolTable};

pub struct ResolveOutput {
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
}

/// Builds the symbol table for a whole program.
pub fn resolve(program: &Program) -> ResolveOutput {
    let mut symbols = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();

    for function in &program.functions {
        resolve_function(function, &mut symbols, &mut diagnostics);
    }
    resolve_main(&program.main, &mut symbols, &mut diagnostics);

    ResolveOutput {
        symbols,
        diagnostics,
    }
}

fn resolve_function(function: &Function, symbols: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    let mut sym = FunctionSymbol::new(function.name.clone(), function.return_type);

    for param in &function.params {
        if !sym.add_parameter(param.name.clone(), param.ty) {
            diagnostics.push(
                param.span,
                format!("duplicate parameter name: '{}'", param.name),
            );
        }
    }

    resolve_body(&function.body.declarations, &function.body.instructions, &mut sym, diagnostics);

    if !symbols.add_function(sym) {
        diagnostics.push(
            function.span,
            format!("duplicate function name: '{}'", function.name),
        );
    }
}

fn resolve_main(main: &MainFunction, symbols: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    let mut sym = FunctionSymbol::new("main".to_string(), None);
    sym.reserve_main_args_slot();

    resolve_body(&main.body.declarations, &main.body.instructions, &mut sym, diagnostics);

    if !symbols.add_function(sym) {
        diagnostics.push(main.span, "duplicate function name: 'main'".to_string());
    }
}

fn resolve_body(
    declarations: &[Declaration],
    instructions: &[Instruction],
    sym: &mut FunctionSymbol,
    diagnostics: &mut Diagnostics,
) {
    for decl in declarations {
        resolve_expression(&decl.value, sym, diagnostics);
        if !sym.add_local(decl.name.clone(), decl.ty) {
            diagnostics.push(
                decl.span,
                format!("duplicate local variable name: '{}'", decl.name),
            );
        }
    }

    for instruction in instructions {
        resolve_instruction(instruction, sym, diagnostics);
    }
}

fn resolve_instruction(instruction: &Instruction, sym: &mut FunctionSymbol, diagnostics: &mut Diagnostics) {
    match instruction {
        Instruction::Assignment { value, .. } => resolve_expression(value, sym, diagnostics),
        Instruction::Block { instructions, .. } => {
            for i in instructions {
                resolve_instruction(i, sym, diagnostics);
            }
        }
        Instruction::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            resolve_expression(condition, sym, diagnostics);
            for i in then_branch {
                resolve_instruction(i, sym, diagnostics);
            }
            if let Some(else_branch) = else_branch {
                for i in else_branch {
                    resolve_instruction(i, sym, diagnostics);
                }
            }
        }
        Instruction::While { condition, body, .. } => {
            resolve_expression(condition, sym, diagnostics);
            for i in body {
                resolve_instruction(i, sym, diagnostics);
            }
        }
        Instruction::Print { value, .. } => {
            if let Some(value) = value {
                resolve_expression(value, sym, diagnostics);
            }
        }
        Instruction::CallStatement { call, .. } => resolve_call(call, sym, diagnostics),
        Instruction::Return { value, .. } => {
            if let Some(value) = value {
                resolve_expression(value, sym, diagnostics);
            }
        }
    }
}

fn resolve_call(call: &Call, sym: &mut FunctionSymbol, diagnostics: &mut Diagnostics) {
    for arg in &call.args {
        resolve_expression(arg, sym, diagnostics);
    }
}

fn resolve_expression(expr: &Expression, sym: &mut FunctionSymbol, diagnostics: &mut Diagnostics) {
    match expr {
        Expression::Unary { operand, .. } => resolve_expression(operand, sym, diagnostics),
        Expression::Binary { left, right, .. } => {
            resolve_expression(left, sym, diagnostics);
            resolve_expression(right, sym, diagnostics);
        }
        Expression::Call(call) => resolve_call(call, sym, diagnostics),
        Expression::Atom(atom) => resolve_atom(atom, sym, diagnostics),
    }
}

fn resolve_atom(atom: &Atom, sym: &mut FunctionSymbol, diagnostics: &mut Diagnostics) {
    match atom {
        Atom::Identifier { name, span } => {
            if sym.local_type(name).is_none() {
                diagnostics.push(*span, format!("use without declaration: '{name}'"));
            }
        }
        Atom::Paren { inner, .. } => resolve_expression(inner, sym, diagnostics),
        Atom::IntLiteral { .. }
        | Atom::FloatLiteral { .. }
        | Atom::BoolLiteral { .. }
        | Atom::StringLiteral { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juliac_parser::parse;

    #[test]
    fn registers_params_and_locals() {
        let program = parse("function f(x::Integer)::Integer return x end\nfunction main() end").unwrap();
        let out = resolve(&program);
        assert!(!out.diagnostics.has_errors());
        let f = out.symbols.get("f").unwrap();
        assert_eq!(f.parameters.len(), 1);
    }

    #[test]
    fn flags_use_without_declaration() {
        let program = parse("function main() println(x) end").unwrap();
        let out = resolve(&program);
        assert!(out.diagnostics.has_errors());
    }

    #[test]
    fn flags_duplicate_function_name() {
        let program = parse("function f() end\nfunction f() end\nfunction main() end").unwrap();
        let out = resolve(&program);
        assert!(out.diagnostics.has_errors());
    }

    #[test]
    fn flags_duplicate_parameter() {
        let program = parse("function f(x::Integer, x::Integer) end\nfunction main() end").unwrap();
        let out = resolve(&program);
        assert!(out.diagnostics.has_errors());
    }
}
