//! End-to-end symbolication: parse → resolve → render
//!
//! Kept separate from `main` so integration tests can drive the whole flow
//! with their own [`AddressResolver`].

use log::debug;
use std::path::Path;

use crate::domain::{InputError, ReportModel};
use crate::parsing::parse_report;
use crate::render::render_report;
use crate::symbolization::{
    executable_for_artifact, parse_library_mapping, AddressResolver, ResolveOptions,
    ResolveSummary, SymbolPaths, SymbolResolver,
};

/// Output of one symbolication run
#[derive(Debug)]
pub struct Symbolicated {
    pub model: ReportModel,
    pub lines: Vec<String>,
    pub summary: ResolveSummary,
}

/// Build the library → artifact table for a parsed report.
///
/// The crashed process maps to `symbols`; each `NAME=PATH` mapping adds or
/// replaces one entry.
///
/// # Errors
/// Returns [`InputError::InvalidSymbolMapping`] for a malformed mapping
pub fn build_symbol_paths(
    model: &ReportModel,
    symbols: &Path,
    mappings: &[String],
) -> Result<SymbolPaths, InputError> {
    let mut paths = SymbolPaths::new();
    if model.process.name.is_empty() {
        debug!("report has no Path: header, main executable cannot be matched");
    } else {
        paths.insert(model.process.name.clone(), executable_for_artifact(symbols));
    }
    for mapping in mappings {
        let (name, path) = parse_library_mapping(mapping)?;
        paths.insert(name, path);
    }
    Ok(paths)
}

/// Parse `text`, resolve its frames and render the annotated report
///
/// Nothing is rendered if resolution fails.
///
/// # Errors
/// Returns the first resolver failure unless `options.keep_going` is set
pub fn symbolicate<R: AddressResolver + ?Sized>(
    text: &str,
    paths: impl FnOnce(&ReportModel) -> Result<SymbolPaths, InputError>,
    resolver: &R,
    options: ResolveOptions,
) -> anyhow::Result<Symbolicated> {
    let model = parse_report(text.lines());
    let paths = paths(&model)?;
    let (symbols, summary) = SymbolResolver::new(resolver, options).resolve(&model, &paths)?;
    let lines = render_report(text.lines(), &symbols);
    Ok(Symbolicated { model, lines, summary })
}
