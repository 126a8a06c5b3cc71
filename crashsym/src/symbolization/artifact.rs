//! Symbol artifact handling
//!
//! Maps the paths given on the command line to the files the resolver should
//! read, and builds the library name → artifact table used for resolution.

use log::{debug, warn};
use object::{Architecture, Object};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::InputError;

/// Library name → on-disk symbol artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolPaths {
    entries: BTreeMap<String, PathBuf>,
}

impl SymbolPaths {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the artifact for `library`
    pub fn insert(&mut self, library: impl Into<String>, artifact: impl Into<PathBuf>) {
        self.entries.insert(library.into(), artifact.into());
    }

    #[must_use]
    pub fn get(&self, library: &str) -> Option<&Path> {
        self.entries.get(library).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Path the resolver should be pointed at for a user-supplied artifact.
///
/// Application bundles resolve to their embedded executable
/// (`<bundle>/Contents/MacOS/<bundle-base-name>`); `.dSYM` bundles and plain
/// executables are used as given.
#[must_use]
pub fn executable_for_artifact(path: &Path) -> PathBuf {
    let is_app = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("app"));
    match (is_app, path.file_stem()) {
        (true, Some(stem)) => path.join("Contents").join("MacOS").join(stem),
        _ => path.to_path_buf(),
    }
}

/// Parse a `NAME=PATH` library mapping from the command line
///
/// # Errors
/// Returns [`InputError::InvalidSymbolMapping`] when either side is empty or
/// the `=` is missing.
pub fn parse_library_mapping(spec: &str) -> Result<(String, PathBuf), InputError> {
    match spec.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), executable_for_artifact(Path::new(path.trim()))))
        }
        _ => Err(InputError::InvalidSymbolMapping(spec.to_string())),
    }
}

/// Locate the Mach-O file inside a `.dSYM` bundle, or the artifact itself
fn inspectable_file(artifact: &Path) -> Option<PathBuf> {
    if artifact.is_file() {
        return Some(artifact.to_path_buf());
    }
    let dwarf_dir = artifact.join("Contents").join("Resources").join("DWARF");
    fs::read_dir(dwarf_dir).ok()?.flatten().map(|e| e.path()).find(|p| p.is_file())
}

/// Warn about artifacts that will resolve poorly
///
/// Only thin Mach-O files are inspected; anything `object` cannot parse
/// (universal binaries, missing files) is left for the resolver to report.
pub fn check_debug_symbols(artifact: &Path) {
    let Some(file) = inspectable_file(artifact) else {
        debug!("no inspectable symbol file under {}", artifact.display());
        return;
    };
    let Ok(data) = fs::read(&file) else {
        return;
    };
    let Ok(obj) = object::File::parse(&*data) else {
        debug!("{} is not a thin object file, skipping inspection", file.display());
        return;
    };

    if obj.architecture() != Architecture::X86_64 {
        warn!(
            "{} is built for {:?}, only x86_64 reports can be symbolicated",
            file.display(),
            obj.architecture()
        );
    }

    let has_symtab = obj.symbol_table().is_some();
    if !obj.has_debug_symbols() && !has_symtab {
        warn!("{} is stripped, frames will resolve to addresses only", file.display());
    } else if !obj.has_debug_symbols() {
        warn!("{} has no debug info, source locations unavailable", file.display());
    }
}
