//! Pre-flight checks for crashsym
//!
//! Validates the command-line inputs before any parsing or resolver work, so
//! a missing file fails fast with a distinct error per input.

use log::debug;
use std::path::Path;

use crate::domain::InputError;
use crate::symbolization::{check_debug_symbols, executable_for_artifact};

/// Run all pre-flight checks on the report and symbol artifact
///
/// # Errors
/// Returns [`InputError::ReportNotFound`] or [`InputError::SymbolsNotFound`]
pub fn run_preflight_checks(report: &Path, symbols: &Path) -> Result<(), InputError> {
    check_report_exists(report)?;
    check_symbols_exist(symbols)?;
    check_debug_symbols(&executable_for_artifact(symbols));
    Ok(())
}

/// Check that the crash report exists and is a file
pub fn check_report_exists(report: &Path) -> Result<(), InputError> {
    if !report.is_file() {
        return Err(InputError::ReportNotFound(report.to_path_buf()));
    }
    Ok(())
}

/// Check that the symbol artifact exists (file or bundle directory)
pub fn check_symbols_exist(symbols: &Path) -> Result<(), InputError> {
    if !symbols.exists() {
        return Err(InputError::SymbolsNotFound(symbols.to_path_buf()));
    }
    debug!("symbol artifact: {}", symbols.display());
    Ok(())
}
