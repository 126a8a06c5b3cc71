//! Domain model for crashsym
//!
//! This module contains the report model and errors shared by the parser,
//! resolver and renderer.

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{LibraryInfo, ProcessInfo, ReportModel, StackFrame, SymbolMap, ThreadInfo};

pub use errors::{InputError, ResolveError};
