//! Pipeline orchestration: parse, resolve, typecheck, then either emit
//! Jasmin or report liveness. Each stage runs only if the previous one
//! reported no errors, matching the externally observed exit-code and
//! stdout/stderr contract.

use juliac_parser::{parse, SyntaxError};

use crate::codegen;
use crate::diagnostics::exit_code;
use crate::liveness;
use crate::resolve::resolve;
use crate::typeck::typecheck;

/// Which back end the driver runs once type checking succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compile,
    Liveness,
}

/// Knobs the CLI layer fills in from command-line flags.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub mode: Mode,
    /// The emitted class's name; for `-compile` this is the output
    /// file's stem.
    pub class_name: String,
    pub debug: bool,
}

/// Everything the driver produced: the lines to print to stdout and
/// stderr, the process exit code, and — only in `Mode::Compile` — the
/// Jasmin text to write to the output file.
#[derive(Debug, Default)]
pub struct CompileOutcome {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub jasmin: Option<String>,
}

/// Runs the full pipeline over `source`, stopping at the first stage
/// that reports an error.
pub fn compile(source: &str, options: &CompileOptions) -> CompileOutcome {
    let mut outcome = CompileOutcome::default();

    outcome.stdout.push("Status: parsing".to_string());
    let program = match parse(source) {
        Ok(program) => program,
        Err(errors) => {
            outcome.stderr.extend(errors.iter().map(render_syntax_error));
            outcome.exit_code = exit_code::SYNTAX_ERROR;
            return outcome;
        }
    };

    outcome.stdout.push("Status: resolving".to_string());
    let mut resolved = resolve(&program);
    if resolved.diagnostics.has_errors() {
        outcome
            .stderr
            .extend(resolved.diagnostics.iter().map(|d| d.to_string()));
        outcome.exit_code = exit_code::NAME_ERROR;
        return outcome;
    }

    outcome.stdout.push("Status: type checking".to_string());
    let diagnostics = typecheck(&program, &mut resolved.symbols);
    if diagnostics.has_errors() {
        outcome.stderr.extend(diagnostics.iter().map(|d| d.to_string()));
        outcome.exit_code = exit_code::TYPE_ERROR;
        return outcome;
    }

    match options.mode {
        Mode::Compile => {
            outcome.stdout.push("Status: generating code".to_string());
            if options.debug {
                outcome.stdout.push(dump_symbols(&resolved.symbols));
            }
            let jasmin = codegen::emit_program(&program, &resolved.symbols, &options.class_name);
            outcome.jasmin = Some(jasmin);
        }
        Mode::Liveness => {
            outcome.stdout.push("Status: analyzing liveness".to_string());
            for report in liveness::analyze(&program, &resolved.symbols) {
                if options.debug {
                    outcome.stdout.push(report.render_cfg().to_string());
                }
                outcome.stdout.push(report.render());
            }
        }
    }

    outcome.exit_code = exit_code::SUCCESS;
    outcome
}

fn dump_symbols(symbols: &crate::symtab::SymbolTable) -> String {
    let mut out = String::from("-- symbol table --\n");
    for function in symbols.iter() {
        let params: Vec<String> = function
            .parameters
            .iter()
            .map(|(n, t)| format!("{n}: {t}"))
            .collect();
        let ret = function
            .return_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Void".to_string());
        out.push_str(&format!(
            "{}({}) -> {}\n",
            function.name,
            params.join(", "),
            ret
        ));
    }
    out
}

fn render_syntax_error(err: &SyntaxError) -> String {
    let (span, message) = match err {
        SyntaxError::UnexpectedToken {
            found,
            expected,
            span,
        } => (
            Some(*span),
            format!("unexpected token '{found}', expected {expected}"),
        ),
        SyntaxError::UnexpectedEof { expected } => {
            (None, format!("unexpected end of input, expected {expected}"))
        }
        SyntaxError::InvalidNumber { literal, span } => {
            (Some(*span), format!("invalid number literal '{literal}'"))
        }
        SyntaxError::UnterminatedString { span } => {
            (Some(*span), "unterminated string literal".to_string())
        }
        SyntaxError::InvalidSyntax { message, span } => (Some(*span), message.clone()),
        SyntaxError::LexerError { span } => (Some(*span), "unrecognized token".to_string()),
    };

    match span {
        Some(span) => format!("line {}:{} {}", span.start_line, span.start_column, message),
        None => format!("line ?:? {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_mode(src: &str, mode: Mode) -> CompileOutcome {
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
    fn s1_compile_success_emits_both_methods() {
        let outcome = compile_mode(
            "function f(x::Integer)::Integer return x+1 end\nfunction main() println(f(41)) end",
            Mode::Compile,
        );
        assert_eq!(outcome.exit_code, exit_code::SUCCESS);
        let jasmin = outcome.jasmin.unwrap();
        assert!(jasmin.contains(".method public static f(I)I"));
        assert!(jasmin.contains("main([Ljava/lang/String;)V"));
    }

    #[test]
    fn s2_widening_accepted_and_emits_i2d() {
        let outcome = compile_mode("function main() y::Float64 = 1 println(y) end", Mode::Compile);
        assert_eq!(outcome.exit_code, exit_code::SUCCESS);
        assert!(outcome.jasmin.unwrap().contains("i2d"));
    }

    #[test]
    fn s3_type_error_reports_expected_message() {
        let outcome = compile_mode("function main() s::String = 1 end", Mode::Compile);
        assert_eq!(outcome.exit_code, exit_code::TYPE_ERROR);
        assert!(outcome
            .stderr
            .iter()
            .any(|l| l.contains("wrong value type for variable: 's', expected: 'String', got: 'Integer'")));
    }

    #[test]
    fn s4_argument_widening_rejected() {
        let outcome = compile_mode(
            "function f(x::Float64)::Float64 return x end\nfunction main() println(f(1)) end",
            Mode::Compile,
        );
        assert_eq!(outcome.exit_code, exit_code::TYPE_ERROR);
        assert!(outcome
            .stderr
            .iter()
            .any(|l| l.contains("wrong argument type: 'Integer', expected: 'Float64'")));
    }

    #[test]
    fn s5_missing_return_reported() {
        let outcome = compile_mode(
            "function f(x::Integer)::Integer x = x+1 end\nfunction main() end",
            Mode::Compile,
        );
        assert_eq!(outcome.exit_code, exit_code::TYPE_ERROR);
        assert!(outcome
            .stderr
            .iter()
            .any(|l| l.contains("missing return statement")));
    }

    #[test]
    fn s6_liveness_reports_registers_for_each_function() {
        let outcome = compile_mode(
            "function main() a::Integer = 1 b::Integer = 2 c::Integer = a+b println(c) end",
            Mode::Liveness,
        );
        assert_eq!(outcome.exit_code, exit_code::SUCCESS);
        assert!(outcome.stdout.iter().any(|l| l.starts_with("Function: main")));
        assert!(outcome.stdout.iter().any(|l| l.starts_with("Registers:")));
    }

    #[test]
    fn syntax_error_exits_with_code_one() {
        let outcome = compile_mode("function main( end", Mode::Compile);
        assert_eq!(outcome.exit_code, exit_code::SYNTAX_ERROR);
        assert!(!outcome.stderr.is_empty());
    }
}
