//! Common types shared across the compiler

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in an IDL source file (1-based line and column).
///
/// The file name is not necessarily the file the lexer was constructed
/// with: `#line` directives emitted by the preprocessor redirect it back
/// to the original include.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location for the start of a named file.
    pub fn start_of(file: impl Into<String>) -> Self {
        Self::new(file, 1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        let loc = SourceLocation::new("foo.idl", 3, 14);
        assert_eq!(loc.to_string(), "foo.idl:3:14");
    }

    #[test]
    fn start_of_is_one_based() {
        let loc = SourceLocation::start_of("bar.idl");
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 1);
    }
}
