//! Structured error types for crashsym
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the inputs named on the command line
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Crash report not found: {}", .0.display())]
    ReportNotFound(PathBuf),

    #[error("Symbol file not found: {}", .0.display())]
    SymbolsNotFound(PathBuf),

    #[error("Invalid library mapping '{0}', expected NAME=PATH")]
    InvalidSymbolMapping(String),
}

/// Failures while running the external resolver for one library
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to run resolver '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Resolver failed for {library} ({status}): {stderr}")]
    Failed { library: String, status: String, stderr: String },

    #[error("Resolver returned {actual} lines for {expected} addresses in {library}")]
    OutputMismatch { library: String, expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
