//! ibORB IDL compiler
//!
//! A standalone CORBA IDL compiler that parses interface definitions
//! and generates C++11 bindings following the IDL to C++11 language
//! mapping.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser (+ symbol table) → AST → C++ generator
//! ```
//!
//! The lexer is a pull-based scanner with unlimited look-ahead; the
//! parser is a recursive descent pass that resolves scopes and folds
//! constant expressions as it goes; the generator renders the tree by
//! exhaustive pattern matching. All three accumulate diagnostics
//! instead of failing fast, so one run reports every problem it can.
//!
//! # Example
//!
//! ```
//! use iborb_idl::{codegen::GeneratorConfig, compile_to_string};
//!
//! let idl = "module Clock { interface Timer { readonly attribute long ticks; }; };";
//! let (header, _source) =
//!     compile_to_string(idl, "clock.idl", GeneratorConfig::default()).unwrap();
//! assert!(header.contains("class Timer"));
//! ```

pub mod ast;
pub mod codegen;
pub mod common;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod resolve;

pub use ast::TranslationUnit;
pub use codegen::{CppGenerator, GeneratorConfig};
pub use common::SourceLocation;
pub use diagnostics::{CompileError, Diagnostic, Severity};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use resolve::{Symbol, SymbolKind, SymbolTable};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse IDL source into a tree, symbol table, and diagnostics.
pub fn parse(source: &str, filename: &str) -> (TranslationUnit, SymbolTable, Vec<Diagnostic>) {
    let mut parser = Parser::new(source, filename);
    let unit = parser.parse();
    let (symbols, diagnostics) = parser.into_parts();
    (unit, symbols, diagnostics)
}

/// Compile IDL source to in-memory header and source buffers.
///
/// File I/O is skipped regardless of `config.output_dir`. Fails when the
/// parse produced errors or the generator reported any.
pub fn compile_to_string(
    source: &str,
    filename: &str,
    config: GeneratorConfig,
) -> Result<(String, String), CompileError> {
    let mut parser = Parser::new(source, filename);
    let unit = parser.parse();
    if parser.has_errors() {
        return Err(CompileError::ParseFailed {
            file: filename.to_string(),
            count: parser.error_count(),
        });
    }

    let mut generator = CppGenerator::new(GeneratorConfig {
        output_dir: None,
        ..config
    });
    if !generator.generate(&unit, parser.symbol_table()) {
        return Err(CompileError::CodegenFailed {
            file: filename.to_string(),
        });
    }

    Ok((generator.header().to_string(), generator.source().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn parse_exposes_unit_table_and_diagnostics() {
        let (unit, symbols, diagnostics) = parse("struct S { long x; };", "s.idl");
        assert_eq!(unit.definitions.len(), 1);
        assert!(symbols.lookup_qualified("S").is_some());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn compile_to_string_reports_parse_failures() {
        let err = compile_to_string("struct {", "bad.idl", GeneratorConfig::default());
        assert!(matches!(err, Err(CompileError::ParseFailed { .. })));
    }
}
