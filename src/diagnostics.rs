//! Diagnostic accumulation and pipeline errors
//!
//! The lexer, parser, and emitter never abort on bad input; they append
//! [`Diagnostic`] records and keep going. [`CompileError`] covers the
//! failures of the driver pipeline itself (I/O, preprocessor, a parse
//! that produced errors), reported through miette.

use crate::common::SourceLocation;
use miette::Diagnostic as MietteDiagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A collected diagnostic with its source location
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    pub fn warning(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", self.location, kind, self.message)
    }
}

/// Pipeline-level failure
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CompileError {
    #[error("cannot read `{}`", path.display())]
    #[diagnostic(code(idlc::read_input))]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preprocessor failed: {message}")]
    #[diagnostic(
        code(idlc::preprocess),
        help("pass --no-preprocess to compile the raw IDL text")
    )]
    Preprocess { message: String },

    #[error("{file}: parsing failed with {count} error(s)")]
    #[diagnostic(code(idlc::parse_failed))]
    ParseFailed { file: String, count: usize },

    #[error("code generation failed for `{file}`")]
    #[diagnostic(code(idlc::codegen_failed))]
    CodegenFailed { file: String },

    #[error("cannot create output directory `{}`", path.display())]
    #[diagnostic(code(idlc::output_dir))]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_location_and_kind() {
        let d = Diagnostic::error("Expected ';'", SourceLocation::new("a.idl", 2, 7));
        assert_eq!(d.to_string(), "a.idl:2:7: error: Expected ';'");
        let w = Diagnostic::warning("Unknown constant: X", SourceLocation::new("a.idl", 4, 1));
        assert!(w.is_warning());
        assert!(w.to_string().contains("warning"));
    }
}
