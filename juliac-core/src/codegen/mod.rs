//! Jasmin text emission: the code-generation back end.
//!
//! A tree-walking emitter produces one public class per compiled file,
//! named after the output file stem, with one synthetic `<init>`, one
//! `main([Ljava/lang/String;)V`, and one method per user function.
//! Each method is buffered separately so its `.limit locals` and
//! `.limit stack` can be written once the body's slot count and peak
//! stack height are known, rather than rewritten in place afterward.

mod expr;
mod slots;
mod stmt;

use juliac_parser::ast::{MainFunction, Program, Type};

use crate::symtab::{FunctionSymbol, SymbolTable};
use slots::SlotMap;

/// Running `(current, max)` operand-stack height, updated by every
/// emitted instruction using the push/pop cost table in §4.3: one slot
/// for Integer/Bool/String, two for Float64.
#[derive(Debug, Default)]
struct StackSize {
    current: i32,
    max: i32,
}

impl StackSize {
    fn push(&mut self, n: i32) {
        self.current += n;
        if self.current > self.max {
            self.max = self.current;
        }
    }

    fn pop(&mut self, n: i32) {
        self.current -= n;
    }

    /// Resets the running height to `value` without touching `max`,
    /// used where two alternative control-flow paths (an if/else arm,
    /// a boolean-to-string branch) each leave the stack at the same
    /// height as the other.
    fn restore(&mut self, value: i32) {
        self.current = value;
    }
}

/// Per-function emission state.
struct Emitter<'a> {
    class_name: &'a str,
    symbols: &'a SymbolTable,
    function: &'a FunctionSymbol,
    slots: SlotMap,
    stack: StackSize,
    label_counter: u32,
    body: String,
}

impl<'a> Emitter<'a> {
    fn new(class_name: &'a str, symbols: &'a SymbolTable, function: &'a FunctionSymbol) -> Self {
        Self {
            class_name,
            symbols,
            function,
            slots: SlotMap::new(function),
            stack: StackSize::default(),
            label_counter: 0,
            body: String::new(),
        }
    }

    fn emit(&mut self, instruction: impl AsRef<str>) {
        self.body.push_str("        ");
        self.body.push_str(instruction.as_ref());
        self.body.push('\n');
    }

    fn emit_label(&mut self, label: &str) {
        self.body.push_str(label);
        self.body.push_str(":\n");
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }
}

fn cost_of(ty: Type) -> i32 {
    if ty == Type::Float64 {
        2
    } else {
        1
    }
}

fn jvm_type_descriptor(ty: Type) -> &'static str {
    match ty {
        Type::Integer | Type::Bool => "I",
        Type::Float64 => "D",
        Type::String => "Ljava/lang/String;",
    }
}

fn jvm_return_descriptor(ty: Option<Type>) -> String {
    match ty {
        Some(ty) => jvm_type_descriptor(ty).to_string(),
        None => "V".to_string(),
    }
}

fn method_descriptor(params: &[Type], return_type: Option<Type>) -> String {
    let mut descriptor = String::from("(");
    for ty in params {
        descriptor.push_str(jvm_type_descriptor(*ty));
    }
    descriptor.push(')');
    descriptor.push_str(&jvm_return_descriptor(return_type));
    descriptor
}

/// Emits the full Jasmin source for `program` as a class named
/// `class_name`.
pub fn emit_program(program: &Program, symbols: &SymbolTable, class_name: &str) -> String {
    let mut out = String::new();
    out.push_str(".bytecode 50.0\n");
    out.push_str(&format!(".class public {class_name}\n"));
    out.push_str(".super java/lang/Object\n\n");
    out.push_str(".method public <init>()V\n");
    out.push_str("    .limit stack 1\n");
    out.push_str("    .limit locals 1\n");
    out.push_str("    aload_0\n");
    out.push_str("    invokespecial java/lang/Object/<init>()V\n");
    out.push_str("    return\n");
    out.push_str(".end method\n\n");

    for function in &program.functions {
        let sym = symbols
            .get(&function.name)
            .expect("resolved symbol table is missing a checked function");
        out.push_str(&emit_function_method(&function.body, sym, symbols, class_name));
        out.push('\n');
    }

    let main_sym = symbols.get("main").expect("resolved symbol table always has 'main'");
    out.push_str(&emit_main_method(&program.main, main_sym, symbols, class_name));

    out
}

fn emit_function_method(
    body: &juliac_parser::ast::FunctionBody,
    sym: &FunctionSymbol,
    symbols: &SymbolTable,
    class_name: &str,
) -> String {
    let params: Vec<Type> = sym.parameters.iter().map(|(_, t)| *t).collect();
    let descriptor = method_descriptor(&params, sym.return_type);

    let mut em = Emitter::new(class_name, symbols, sym);
    stmt::emit_body(&mut em, &body.declarations, &body.instructions, sym.return_type);

    let mut out = String::new();
    out.push_str(&format!(".method public static {}{}\n", sym.name, descriptor));
    out.push_str(&format!("    .limit stack {}\n", em.stack.max.max(1)));
    out.push_str(&format!("    .limit locals {}\n", em.slots.total_slots().max(1)));
    out.push_str(&em.body);
    out.push_str(".end method\n");
    out
}

fn emit_main_method(
    main: &MainFunction,
    sym: &FunctionSymbol,
    symbols: &SymbolTable,
    class_name: &str,
) -> String {
    let mut em = Emitter::new(class_name, symbols, sym);
    stmt::emit_body(&mut em, &main.body.declarations, &main.body.instructions, None);

    let mut out = String::new();
    out.push_str(".method public static main([Ljava/lang/String;)V\n");
    out.push_str(&format!("    .limit stack {}\n", em.stack.max.max(1)));
    out.push_str(&format!("    .limit locals {}\n", em.slots.total_slots().max(1)));
    out.push_str(&em.body);
    out.push_str(".end method\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use crate::typeck::typecheck;
    use juliac_parser::parse;

    fn compile(src: &str) -> (String, bool) {
        let program = parse(src).unwrap();
        let mut resolved = resolve(&program);
        assert!(!resolved.diagnostics.has_errors());
        let diags = typecheck(&program, &mut resolved.symbols);
        let ok = !diags.has_errors();
        (emit_program(&program, &resolved.symbols, "Test"), ok)
    }

    #[test]
    fn emits_init_and_main() {
        let (jasmin, ok) = compile("function main() end");
        assert!(ok);
        assert!(jasmin.contains(".class public Test"));
        assert!(jasmin.contains(".method public <init>()V"));
        assert!(jasmin.contains("main([Ljava/lang/String;)V"));
    }

    #[test]
    fn emits_user_function_with_descriptor() {
        let (jasmin, ok) =
            compile("function f(x::Integer)::Integer return x+1 end\nfunction main() println(f(41)) end");
        assert!(ok);
        assert!(jasmin.contains(".method public static f(I)I"));
        assert!(jasmin.contains("invokestatic Test/f(I)I"));
    }

    #[test]
    fn widening_emits_i2d() {
        let (jasmin, ok) = compile("function main() y::Float64 = 1 println(y) end");
        assert!(ok);
        assert!(jasmin.contains("i2d"));
    }
}
