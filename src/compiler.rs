//! The compiler under test.
//!
//! The harness never looks inside the compiler: it hands over a file plus
//! options and gets back CSS or a formatted error message.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::fixture::OutputStyle;

/// Everything the compiler is given for one case.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub file: &'a Path,
    pub include_paths: &'a [PathBuf],
    pub precision: u32,
    pub output_style: OutputStyle,
}

/// A compilation failure, as the compiler formatted it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{formatted}")]
pub struct CompileError {
    pub formatted: String,
}

impl CompileError {
    pub fn new(formatted: impl Into<String>) -> Self {
        Self {
            formatted: formatted.into(),
        }
    }
}

pub trait Compiler {
    /// Compiles one file, returning its CSS.
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&RenderRequest<'_>) -> Result<String, CompileError>,
{
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, CompileError> {
        self(request)
    }
}

/// Runs an external executable per case.
///
/// The command line is `<program> <args>… --style <style> --precision <n>
/// [-I <path>]… <file>`. Standard output is the CSS; a non-zero exit turns
/// standard error into the formatted error.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Compiler for CommandCompiler {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, CompileError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--style")
            .arg(request.output_style.as_str())
            .arg("--precision")
            .arg(request.precision.to_string());
        for path in request.include_paths {
            command.arg("-I").arg(path);
        }
        command.arg(request.file);
        debug!(?command, "invoking compiler");

        let output = command.output().map_err(|e| {
            CompileError::new(format!("failed to launch {}: {e}", self.program.display()))
        })?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(CompileError::new(String::from_utf8_lossy(&output.stderr)))
        }
    }
}
