//! Accumulated user-facing diagnostics and process exit codes.
//!
//! Each pipeline stage collects its own errors into a [`Diagnostics`]
//! and reports success or failure at its natural boundary (after
//! walking the whole tree); no stage raises an exception to signal a
//! user error, and a later stage never runs once an earlier one has
//! reported anything.

use juliac_parser::Span;

/// Process exit codes, matching the externally observed contract.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const SYNTAX_ERROR: i32 = 1;
    pub const NAME_ERROR: i32 = 2;
    pub const TYPE_ERROR: i32 = 3;
    pub const ARGUMENT_ERROR: i32 = 4;
    pub const FATAL: i32 = 404;
}

/// One user-facing error, with the source location it applies to.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}:{} {}",
            self.span.start_line, self.span.start_column, self.message
        )
    }
}

/// A growable collection of diagnostics for one pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            span,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_line_column_message() {
        let mut diags = Diagnostics::new();
        diags.push(Span::new(0, 1, 3, 3, 4, 5), "boom");
        let rendered = format!("{}", diags.iter().next().unwrap());
        assert_eq!(rendered, "line 3:4 boom");
    }

    #[test]
    fn empty_diagnostics_has_no_errors() {
        assert!(!Diagnostics::new().has_errors());
    }
}
