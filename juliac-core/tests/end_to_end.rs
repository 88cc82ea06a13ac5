//! End-to-end tests driving the full pipeline through [`juliac_core::compile`].

use juliac_core::diagnostics::exit_code;
use juliac_core::driver::Mode;
use juliac_core::{compile, CompileOptions};

fn run(src: &str, mode: Mode) -> juliac_core::CompileOutcome {
    compile(
        src,
        &CompileOptions {
            mode,
            class_name: "Test".to_string(),
            debug: false,
        },
    )
}

#[test]
fn deterministic_output_across_runs() {
    let src = "function f(x::Integer)::Integer return x+1 end\nfunction main() println(f(41)) end";
    let first = run(src, Mode::Compile).jasmin.unwrap();
    let second = run(src, Mode::Compile).jasmin.unwrap();
    assert_eq!(first, second);
}

#[test]
fn slot_allocation_accounts_for_float_width() {
    let src = "function main() a::Integer = 1 b::Float64 = 2.0 println(b) end";
    let jasmin = run(src, Mode::Compile).jasmin.unwrap();
    // `a` takes slot 0 (plus the reserved main-args slot before it),
    // `b` takes two consecutive slots: total local count is 4.
    assert!(jasmin.contains(".limit locals 4"));
}

#[test]
fn every_accepted_program_emits_a_main_method() {
    let src = "function main() if true println(\"hi\") else println(\"bye\") end end";
    let outcome = run(src, Mode::Compile);
    assert_eq!(outcome.exit_code, exit_code::SUCCESS);
    assert!(outcome.jasmin.unwrap().contains("main([Ljava/lang/String;)V"));
}

#[test]
fn while_loop_compiles_with_back_edge() {
    let src = "function main() x::Integer = 0 while x < 3 x = x + 1 end println(x) end";
    let jasmin = run(src, Mode::Compile).jasmin.unwrap();
    assert!(jasmin.contains("goto"));
    assert!(jasmin.contains("ifeq"));
}

#[test]
fn call_arity_mismatch_is_a_type_error() {
    let src = "function f(x::Integer)::Integer return x end\nfunction main() println(f()) end";
    let outcome = run(src, Mode::Compile);
    assert_eq!(outcome.exit_code, exit_code::TYPE_ERROR);
    assert!(outcome.stderr.iter().any(|l| l.contains("wrong number of arguments")));
}

#[test]
fn void_call_used_as_value_is_rejected() {
    let src =
        "function act() println(1) end\nfunction main() x::Integer = act() println(x) end";
    let outcome = run(src, Mode::Compile);
    assert_eq!(outcome.exit_code, exit_code::TYPE_ERROR);
}

#[test]
fn name_error_stops_before_type_checking() {
    let src = "function main() println(missing_var) end";
    let outcome = run(src, Mode::Compile);
    assert_eq!(outcome.exit_code, exit_code::NAME_ERROR);
}

#[test]
fn duplicate_function_names_rejected() {
    let src = "function f() end\nfunction f() end\nfunction main() end";
    let outcome = run(src, Mode::Compile);
    assert_eq!(outcome.exit_code, exit_code::NAME_ERROR);
}

#[test]
fn liveness_mode_reports_one_register_for_disjoint_locals() {
    let src = "function main() a::Integer = 1 println(a) b::Integer = 2 println(b) end";
    let outcome = run(src, Mode::Liveness);
    assert_eq!(outcome.exit_code, exit_code::SUCCESS);
    assert!(outcome.stdout.iter().any(|l| l == "Registers: 1"));
}

#[test]
fn liveness_mode_covers_every_declared_function() {
    let src = "function f(x::Integer)::Integer return x end\nfunction main() println(f(1)) end";
    let outcome = run(src, Mode::Liveness);
    let function_headers: Vec<_> = outcome
        .stdout
        .iter()
        .filter(|l| l.starts_with("Function:"))
        .collect();
    assert_eq!(function_headers.len(), 2);
}

#[test]
fn string_equality_is_reference_identity_not_content() {
    let src = "function main() a::String = \"x\" b::String = \"x\" println(a == b) end";
    let jasmin = run(src, Mode::Compile).jasmin.unwrap();
    assert!(jasmin.contains("if_acmpeq") || jasmin.contains("if_acmpne"));
}

#[test]
fn logical_operators_are_non_short_circuit_bitwise() {
    let src = "function main() println(true && false) end";
    let jasmin = run(src, Mode::Compile).jasmin.unwrap();
    assert!(jasmin.contains("iand"));
}

#[test]
fn integer_division_truncates_rather_than_widens() {
    let src = "function main() x::Integer = 7 / 2 println(x) end";
    let outcome = run(src, Mode::Compile);
    assert_eq!(outcome.exit_code, exit_code::SUCCESS);
    assert!(outcome.jasmin.unwrap().contains("idiv"));
}
