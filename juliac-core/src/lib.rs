//! Name resolution, type checking, Jasmin code generation, and liveness
//! analysis for the juliac compiler back end.
//!
//! The pipeline is a fixed sequence of stages, each gated on the
//! previous one reporting no errors: [`resolve`] builds the symbol
//! table, [`typeck`] checks types, and then either [`codegen`] emits
//! Jasmin assembly or [`liveness`] reports a per-function register
//! count.

pub mod codegen;
pub mod diagnostics;
pub mod driver;
pub mod liveness;
pub mod resolve;
pub mod symtab;
pub mod typeck;

pub use driver::{compile, CompileOptions, CompileOutcome};
