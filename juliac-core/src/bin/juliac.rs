//! juliac CLI
//!
//! Usage:
//!   juliac -compile input.jl
//!   juliac -compile input.jl -output out.j
//!   juliac -liveness input.jl
//!   juliac -compile input.jl -debug

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use thiserror::Error;

use juliac_core::diagnostics::exit_code;
use juliac_core::driver::{compile, CompileOptions, Mode};

/// Bad or missing CLI flags, reported and exited before any pipeline
/// stage runs.
#[derive(Debug, Error)]
enum ArgsError {
    #[error("{flag} requires a file argument")]
    MissingValue { flag: &'static str },
    #[error("unrecognized option: {0}")]
    Unrecognized(String),
    #[error("-compile and -liveness are mutually exclusive")]
    ConflictingModes,
    #[error("exactly one of -compile or -liveness is required")]
    NoMode,
}

#[derive(Debug, Default)]
struct Args {
    compile_file: Option<String>,
    liveness_file: Option<String>,
    output_file: Option<String>,
    debug: bool,
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let raw: Vec<String> = env::args().collect();
        let mut args = Args::default();

        let mut i = 1;
        while i < raw.len() {
            match raw[i].as_str() {
                "-compile" => {
                    i += 1;
                    match raw.get(i) {
                        Some(file) => args.compile_file = Some(file.clone()),
                        None => return Err(ArgsError::MissingValue { flag: "-compile" }),
                    }
                }
                "-liveness" => {
                    i += 1;
                    match raw.get(i) {
                        Some(file) => args.liveness_file = Some(file.clone()),
                        None => return Err(ArgsError::MissingValue { flag: "-liveness" }),
                    }
                }
                "-output" => {
                    i += 1;
                    match raw.get(i) {
                        Some(file) => args.output_file = Some(file.clone()),
                        None => return Err(ArgsError::MissingValue { flag: "-output" }),
                    }
                }
                "-debug" => args.debug = true,
                other => return Err(ArgsError::Unrecognized(other.to_string())),
            }
            i += 1;
        }

        if args.compile_file.is_some() && args.liveness_file.is_some() {
            return Err(ArgsError::ConflictingModes);
        }
        if args.compile_file.is_none() && args.liveness_file.is_none() {
            return Err(ArgsError::NoMode);
        }
        Ok(args)
    }
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            process::exit(exit_code::ARGUMENT_ERROR);
        }
    };

    let (mode, input_file) = match (&args.compile_file, &args.liveness_file) {
        (Some(file), None) => (Mode::Compile, file.clone()),
        (None, Some(file)) => (Mode::Liveness, file.clone()),
        _ => unreachable!("Args::parse already enforced exactly one mode"),
    };

    if Path::new(&input_file).extension().and_then(|e| e.to_str()) != Some("jl") {
        eprintln!("warning: input file '{input_file}' does not have a .jl extension");
    }

    let source = fs::read_to_string(&input_file).unwrap_or_else(|err| {
        eprintln!("error: could not read '{input_file}': {err}");
        process::exit(exit_code::FATAL);
    });

    let output_file = match mode {
        Mode::Compile => Some(resolve_output_path(&input_file, &args.output_file)),
        Mode::Liveness => None,
    };

    if let Some(output_file) = &output_file {
        if Path::new(output_file).extension().and_then(|e| e.to_str()) != Some("j") {
            eprintln!("warning: output file '{output_file}' does not have a .j extension");
        }
        if Path::new(output_file).exists() {
            eprintln!("warning: output file '{output_file}' already exists and will be overwritten");
        }
    }

    let class_name = Path::new(&input_file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Main".to_string());

    let options = CompileOptions {
        mode,
        class_name,
        debug: args.debug,
    };
    let outcome = compile(&source, &options);

    for line in &outcome.stdout {
        println!("{line}");
    }
    for line in &outcome.stderr {
        eprintln!("{line}");
    }

    if outcome.exit_code == exit_code::SUCCESS {
        if let (Some(jasmin), Some(output_file)) = (&outcome.jasmin, &output_file) {
            if let Err(err) = fs::write(output_file, jasmin) {
                eprintln!("error: could not write '{output_file}': {err}");
                process::exit(exit_code::FATAL);
            }
            println!("Generated: {output_file}");
        }
    }

    process::exit(outcome.exit_code);
}

fn resolve_output_path(input_file: &str, override_path: &Option<String>) -> String {
    if let Some(path) = override_path {
        return path.clone();
    }
    let path = Path::new(input_file);
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(format!("{stem}.j")).to_string_lossy().to_string()
        }
        _ => format!("{stem}.j"),
    }
}
