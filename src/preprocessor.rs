//! External C preprocessor glue
//!
//! IDL files use `#include` and macros, which the core never sees: a
//! system C preprocessor expands them first and its `#line` markers let
//! the lexer keep reporting original positions. This module locates a
//! preprocessor, runs it, and captures its output. When none is
//! installed the driver falls back to the raw IDL text.

use crate::diagnostics::CompileError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const CANDIDATES: &[&str] = &["gcc", "clang", "cc"];

/// Driver for an external C preprocessor subprocess.
pub struct Preprocessor {
    command: Option<String>,
    include_paths: Vec<PathBuf>,
    defines: Vec<(String, String)>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    /// Probe the system for a usable preprocessor.
    pub fn new() -> Self {
        let command = CANDIDATES
            .iter()
            .find(|cand| command_exists(cand))
            .map(|s| s.to_string());
        if let Some(cmd) = &command {
            debug!(command = %cmd, "found C preprocessor");
        }
        Self {
            command,
            include_paths: Vec::new(),
            defines: Vec::new(),
        }
    }

    /// Use a specific compiler binary instead of probing.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            include_paths: Vec::new(),
            defines: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.command.is_some()
    }

    pub fn add_include_path(&mut self, path: impl Into<PathBuf>) {
        self.include_paths.push(path.into());
    }

    pub fn add_define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.defines.push((name.into(), value.into()));
    }

    /// Run the preprocessor over `input`, returning the expanded text.
    pub fn preprocess_file(&self, input: &Path) -> Result<String, CompileError> {
        let Some(command) = &self.command else {
            return Err(CompileError::Preprocess {
                message: "no suitable C preprocessor found (tried gcc, clang, cc)".to_string(),
            });
        };

        let mut cmd = Command::new(command);
        cmd.arg("-E").arg("-x").arg("c");
        for path in &self.include_paths {
            cmd.arg("-I").arg(path);
        }
        for (name, value) in &self.defines {
            if value.is_empty() {
                cmd.arg(format!("-D{name}"));
            } else {
                cmd.arg(format!("-D{name}={value}"));
            }
        }
        cmd.arg(input);

        debug!(?cmd, "running preprocessor");
        let output = cmd.output().map_err(|err| CompileError::Preprocess {
            message: format!("failed to run {command}: {err}"),
        })?;

        if !output.status.success() {
            return Err(CompileError::Preprocess {
                message: format!(
                    "{command} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn command_exists(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_reports_preprocess_error() {
        let pp = Preprocessor::with_command("definitely-not-a-compiler-xyz");
        let err = pp.preprocess_file(Path::new("nothing.idl")).unwrap_err();
        assert!(matches!(err, CompileError::Preprocess { .. }));
    }

    #[test]
    fn probe_does_not_panic() {
        // Whether or not a compiler is installed, probing must succeed.
        let pp = Preprocessor::new();
        let _ = pp.is_available();
    }
}
