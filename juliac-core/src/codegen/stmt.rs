//! Statement and function-body emission.

use juliac_parser::ast::{Declaration, Instruction, Type};

use super::expr::{descriptor_for, emit_call, emit_expr};
use super::{cost_of, Emitter};

pub(super) fn emit_body(
    em: &mut Emitter,
    declarations: &[Declaration],
    instructions: &[Instruction],
    return_type: Option<Type>,
) {
    for decl in declarations {
        emit_declaration(em, decl);
    }
    for instruction in instructions {
        emit_instruction(em, instruction);
    }

    let ends_in_return = matches!(instructions.last(), Some(Instruction::Return { .. }));
    if return_type.is_none() && !ends_in_return {
        em.emit("return");
    }
}

fn emit_declaration(em: &mut Emitter, decl: &Declaration) {
    let value_ty = emit_expr(em, &decl.value);
    widen_if_needed(em, value_ty, decl.ty);
    emit_store(em, &decl.name, decl.ty);
}

fn widen_if_needed(em: &mut Emitter, from: Type, to: Type) {
    if from == Type::Integer && to == Type::Float64 {
        em.emit("i2d");
        em.stack.push(1);
    }
}

fn emit_store(em: &mut Emitter, name: &str, ty: Type) {
    let slot = em.slots.get(name);
    let op = match ty {
        Type::Integer | Type::Bool => "istore",
        Type::Float64 => "dstore",
        Type::String => "astore",
    };
    em.emit(format!("{op} {slot}"));
    em.stack.pop(cost_of(ty));
}

fn emit_instruction(em: &mut Emitter, instruction: &Instruction) {
    match instruction {
        Instruction::Assignment { name, value, .. } => {
            let target_ty = em
                .function
                .local_type(name)
                .expect("typeck already rejected undeclared assignment targets");
            let value_ty = emit_expr(em, value);
            widen_if_needed(em, value_ty, target_ty);
            emit_store(em, name, target_ty);
        }
        Instruction::Block { instructions, .. } => {
            for i in instructions {
                emit_instruction(em, i);
            }
        }
        Instruction::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => emit_if(em, condition, then_branch, else_branch.as_deref()),
        Instruction::While { condition, body, .. } => emit_while(em, condition, body),
        Instruction::Print { value, .. } => emit_print(em, value),
        Instruction::CallStatement { call, .. } => {
            // A call used as a statement discards its value, if any.
            if let Some(ty) = emit_call(em, call) {
                em.stack.pop(cost_of(ty));
            }
        }
        Instruction::Return { value, .. } => emit_return(em, value),
    }
}

fn emit_if(
    em: &mut Emitter,
    condition: &juliac_parser::ast::Expression,
    then_branch: &[Instruction],
    else_branch: Option<&[Instruction]>,
) {
    emit_expr(em, condition);
    let l_then = em.new_label();
    let l_end = em.new_label();
    em.emit(format!("ifne {l_then}"));
    em.stack.pop(1);
    let baseline = em.stack.current;

    if let Some(else_branch) = else_branch {
        for instruction in else_branch {
            emit_instruction(em, instruction);
        }
    }
    em.emit(format!("goto {l_end}"));
    em.stack.restore(baseline);

    em.emit_label(&l_then);
    for instruction in then_branch {
        emit_instruction(em, instruction);
    }
    em.emit_label(&l_end);
}

fn emit_while(em: &mut Emitter, condition: &juliac_parser::ast::Expression, body: &[Instruction]) {
    let l_head = em.new_label();
    let l_end = em.new_label();
    em.emit_label(&l_head);
    let baseline = em.stack.current;

    emit_expr(em, condition);
    em.emit(format!("ifeq {l_end}"));
    em.stack.pop(1);

    for instruction in body {
        emit_instruction(em, instruction);
    }
    em.emit(format!("goto {l_head}"));
    em.stack.restore(baseline);

    em.emit_label(&l_end);
}

fn emit_print(em: &mut Emitter, value: &Option<juliac_parser::ast::Expression>) {
    em.emit("getstatic java/lang/System/out Ljava/io/PrintStream;");
    em.stack.push(1);

    let descriptor = match value {
        None => String::new(),
        Some(expr) => {
            let ty = emit_expr(em, expr);
            if ty == Type::Bool {
                materialize_bool_string(em);
                "Ljava/lang/String;".to_string()
            } else {
                descriptor_for(ty).to_string()
            }
        }
    };

    em.emit(format!("invokevirtual java/io/PrintStream/println({descriptor})V"));
    let arg_width = match descriptor.as_str() {
        "" => 0,
        "D" => 2,
        _ => 1,
    };
    em.stack.pop(1 + arg_width);
}

/// `ifne L_true ; ldc "false" ; goto L_end ; L_true: ldc "true" ; L_end:`
fn materialize_bool_string(em: &mut Emitter) {
    let l_true = em.new_label();
    let l_end = em.new_label();
    em.emit(format!("ifne {l_true}"));
    em.stack.pop(1);
    let baseline = em.stack.current;

    em.emit("ldc \"false\"");
    em.stack.push(1);
    em.emit(format!("goto {l_end}"));
    em.stack.restore(baseline);

    em.emit_label(&l_true);
    em.emit("ldc \"true\"");
    em.stack.push(1);
    em.emit_label(&l_end);
}

fn emit_return(em: &mut Emitter, value: &Option<juliac_parser::ast::Expression>) {
    match value {
        None => em.emit("return"),
        Some(expr) => {
            let value_ty = emit_expr(em, expr);
            let return_type = em.function.return_type.expect(
                "typeck already rejected a return value inside a Void function",
            );
            widen_if_needed(em, value_ty, return_type);
            let op = match return_type {
                Type::Integer | Type::Bool => "ireturn",
                Type::Float64 => "dreturn",
                Type::String => "areturn",
            };
            em.emit(op);
            em.stack.pop(cost_of(return_type));
        }
    }
}
