//! Conformance harness for Sass compilers.
//!
//! Unpacks the HRX archives of a sass-spec checkout, rebuilds the suite tree
//! from the fixture files it finds, and runs each case through a
//! [`compiler::Compiler`], comparing output and errors against the expected
//! files.

pub use crate::diagnostics::{HarnessError, Result};

pub mod archive;
pub mod cli;
pub mod compare;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod dispatch;
pub mod fixture;
pub mod overrides;
pub mod report;
pub mod settings;
pub mod suite;
