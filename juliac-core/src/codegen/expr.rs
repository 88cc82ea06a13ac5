//! Expression emission: literals, operators, and calls.

use juliac_parser::ast::{Atom, BinaryOp, Call, Expression, Type, UnaryOp};

use super::{cost_of, jvm_type_descriptor, method_descriptor, Emitter};

/// Emits `expr` and returns the type of the value it leaves on the
/// operand stack.
pub(super) fn emit_expr(em: &mut Emitter, expr: &Expression) -> Type {
    match expr {
        Expression::Unary { op, operand, .. } => emit_unary(em, *op, operand),
        Expression::Binary { op, left, right, .. } => emit_binary(em, *op, left, right),
        Expression::Call(call) => emit_call(em, call)
            .expect("typeck already rejected a Void call used as an expression"),
        Expression::Atom(atom) => emit_atom(em, atom),
    }
}

fn emit_unary(em: &mut Emitter, op: UnaryOp, operand: &Expression) -> Type {
    let ty = emit_expr(em, operand);
    match op {
        UnaryOp::Plus => ty,
        UnaryOp::Minus => {
            em.emit(if ty == Type::Float64 { "dneg" } else { "ineg" });
            ty
        }
        UnaryOp::Not => {
            em.emit("iconst_1");
            em.stack.push(1);
            em.emit("ixor");
            em.stack.pop(1);
            Type::Bool
        }
    }
}

fn emit_binary(em: &mut Emitter, op: BinaryOp, left: &Expression, right: &Expression) -> Type {
    use BinaryOp::*;
    match op {
        Mul | Div | Rem | Add | Sub => emit_arithmetic(em, op, left, right),
        Eq | NotEq => emit_equality(em, op, left, right),
        Lt | LtEq | Gt | GtEq => emit_ordering(em, op, left, right),
        And => emit_logical(em, "iand", left, right),
        Or => emit_logical(em, "ior", left, right),
    }
}

/// Promotes the lower (`left`) or upper (`right`) operand to Float64
/// when the two sides disagree, following the stack-juggling sequences
/// in §4.3. Returns the unified operand type.
fn promote(em: &mut Emitter, left: Type, right: Type) -> Type {
    match (left, right) {
        (Type::Float64, Type::Float64) => Type::Float64,
        (Type::Integer, Type::Integer) => Type::Integer,
        (Type::Integer, Type::Float64) => {
            // The int sits below the double on the stack; rotate it to
            // the top, widen it, then rotate back.
            em.emit("dup2_x1");
            em.emit("pop2");
            em.emit("i2d");
            em.emit("dup2_x2");
            em.emit("pop2");
            em.stack.push(1);
            Type::Float64
        }
        (Type::Float64, Type::Integer) => {
            em.emit("i2d");
            em.stack.push(1);
            Type::Float64
        }
        (l, _) => l,
    }
}

fn emit_arithmetic(em: &mut Emitter, op: BinaryOp, left: &Expression, right: &Expression) -> Type {
    let lt = emit_expr(em, left);
    let rt = emit_expr(em, right);
    let ty = promote(em, lt, rt);
    let prefix = if ty == Type::Float64 { 'd' } else { 'i' };
    let mnemonic = match op {
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Rem => "rem",
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        _ => unreachable!(),
    };
    em.emit(format!("{prefix}{mnemonic}"));
    em.stack.pop(cost_of(ty));
    ty
}

/// Emits the `if_icmp<cond> L_t ; iconst_0 ; goto L_e ; L_t: iconst_1 ;
/// L_e:` pattern shared by all comparison forms. `jump_if_true` is the
/// branch mnemonic (without its label operand) that should already
/// have consumed its operands off the stack by the time this runs.
fn emit_branch_to_bool(em: &mut Emitter, jump_if_true: &str) {
    let l_true = em.new_label();
    let l_end = em.new_label();
    em.emit(format!("{jump_if_true} {l_true}"));
    let baseline = em.stack.current;
    em.emit("iconst_0");
    em.stack.push(1);
    em.emit(format!("goto {l_end}"));
    em.stack.restore(baseline);
    em.emit_label(&l_true);
    em.emit("iconst_1");
    em.stack.push(1);
    em.emit_label(&l_end);
}

fn emit_equality(em: &mut Emitter, op: BinaryOp, left: &Expression, right: &Expression) -> Type {
    let lt = emit_expr(em, left);
    let rt = emit_expr(em, right);

    if lt == Type::String || rt == Type::String {
        // Reference identity, not content equality: a preserved quirk
        // of the source implementation this emitter is reproducing.
        em.stack.pop(2);
        emit_branch_to_bool(em, if op == BinaryOp::Eq { "if_acmpeq" } else { "if_acmpne" });
        return Type::Bool;
    }

    let ty = promote(em, lt, rt);
    if ty == Type::Float64 {
        em.emit("dcmpg");
        em.stack.pop(4);
        em.stack.push(1);
        let mnemonic = if op == BinaryOp::Eq { "ifeq" } else { "ifne" };
        emit_branch_to_bool(em, mnemonic);
    } else {
        em.stack.pop(2);
        let mnemonic = if op == BinaryOp::Eq { "if_icmpeq" } else { "if_icmpne" };
        emit_branch_to_bool(em, mnemonic);
    }
    Type::Bool
}

fn emit_ordering(em: &mut Emitter, op: BinaryOp, left: &Expression, right: &Expression) -> Type {
    let lt = emit_expr(em, left);
    let rt = emit_expr(em, right);
    let ty = promote(em, lt, rt);

    let op_name = |op: BinaryOp, int_form: bool| -> &'static str {
        match (op, int_form) {
            (BinaryOp::Lt, true) => "if_icmplt",
            (BinaryOp::LtEq, true) => "if_icmple",
            (BinaryOp::Gt, true) => "if_icmpgt",
            (BinaryOp::GtEq, true) => "if_icmpge",
            (BinaryOp::Lt, false) => "iflt",
            (BinaryOp::LtEq, false) => "ifle",
            (BinaryOp::Gt, false) => "ifgt",
            (BinaryOp::GtEq, false) => "ifge",
            _ => unreachable!(),
        }
    };

    if ty == Type::Float64 {
        em.emit("dcmpg");
        em.stack.pop(4);
        em.stack.push(1);
        emit_branch_to_bool(em, op_name(op, false));
    } else {
        em.stack.pop(2);
        emit_branch_to_bool(em, op_name(op, true));
    }
    Type::Bool
}

fn emit_logical(em: &mut Emitter, mnemonic: &str, left: &Expression, right: &Expression) -> Type {
    emit_expr(em, left);
    emit_expr(em, right);
    em.emit(mnemonic);
    em.stack.pop(1);
    Type::Bool
}

/// Emits a call and returns the callee's return type, or `None` for a
/// Void callee (at which point the call may only appear as a
/// statement, never nested inside another expression).
pub(super) fn emit_call(em: &mut Emitter, call: &Call) -> Option<Type> {
    for arg in &call.args {
        emit_expr(em, arg);
    }

    if call.callee == "main" {
        em.emit("iconst_0");
        em.stack.push(1);
        em.emit("anewarray java/lang/String");
        em.emit(format!("invokestatic {}/main([Ljava/lang/String;)V", em.class_name));
        em.stack.pop(1);
        return None;
    }

    let callee = em
        .symbols
        .get(&call.callee)
        .expect("typeck already rejected calls to undeclared functions");
    let param_types: Vec<Type> = callee.parameters.iter().map(|(_, t)| *t).collect();
    let return_type = callee.return_type;
    let descriptor = method_descriptor(&param_types, return_type);
    let class_name = em.class_name;
    let callee_name = callee.name.clone();

    em.emit(format!("invokestatic {class_name}/{callee_name}{descriptor}"));
    let consumed: i32 = param_types.iter().map(|t| cost_of(*t)).sum();
    em.stack.pop(consumed);
    if let Some(rt) = return_type {
        em.stack.push(cost_of(rt));
    }
    return_type
}

fn emit_atom(em: &mut Emitter, atom: &Atom) -> Type {
    match atom {
        Atom::Identifier { name, .. } => {
            let ty = em
                .function
                .local_type(name)
                .expect("typeck already rejected undeclared identifiers");
            let slot = em.slots.get(name);
            let op = match ty {
                Type::Integer | Type::Bool => "iload",
                Type::Float64 => "dload",
                Type::String => "aload",
            };
            em.emit(format!("{op} {slot}"));
            em.stack.push(cost_of(ty));
            ty
        }
        Atom::Paren { inner, .. } => emit_expr(em, inner),
        Atom::IntLiteral { value, .. } => {
            em.emit(format!("ldc {value}"));
            em.stack.push(1);
            Type::Integer
        }
        Atom::FloatLiteral { value, .. } => {
            em.emit(format!("ldc2_w {value}"));
            em.stack.push(2);
            Type::Float64
        }
        Atom::BoolLiteral { value, .. } => {
            em.emit(if *value { "iconst_1" } else { "iconst_0" });
            em.stack.push(1);
            Type::Bool
        }
        Atom::StringLiteral { value, .. } => {
            em.emit(format!("ldc \"{value}\""));
            em.stack.push(1);
            Type::String
        }
    }
}

/// Used by print emission when a printed value's type is already known.
pub(super) fn descriptor_for(ty: Type) -> &'static str {
    jvm_type_descriptor(ty)
}
